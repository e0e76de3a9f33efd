// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fan accepted events out to appenders without blocking the emitting thread.
//!
//! Every [`AppenderHandle`] owns a background worker with its own FIFO queue, so events reach an
//! appender in the order they were emitted and a slow appender never delays another one.

use std::any::Any;
use std::cell::Cell;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::Error;
use crate::Layout;
use crate::record::LogEvent;

mod handle;
mod state;
mod worker;

pub use self::handle::AppenderHandle;
pub use self::handle::HandleBuilder;
pub use self::handle::Overflow;

/// The event rendered by the category layout, shared by all appenders without their own layout.
type Rendered = Arc<Result<String, Error>>;

enum Task {
    Log {
        event: Arc<LogEvent>,
        rendered: Option<Rendered>,
    },
    Flush {
        done: oneshot::Sender<Result<(), Error>>,
    },
}

thread_local! {
    static IN_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is an appender worker.
///
/// Log bridges use this to drop events emitted by the appenders themselves (e.g. by an HTTP
/// client), which would otherwise feed back into the same appenders.
pub fn is_worker_thread() -> bool {
    IN_WORKER.with(Cell::get)
}

/// Render `event` once with `layout` and enqueue it to every appender, in order.
///
/// This never blocks on appender I/O and never fails: errors and panics of the layout are
/// reported to the trap of each appender relying on it.
pub(crate) fn dispatch(event: LogEvent, layout: &dyn Layout, appenders: &[AppenderHandle]) {
    if appenders.is_empty() {
        return;
    }

    let rendered = appenders
        .iter()
        .any(|handle| !handle.overrides_layout())
        .then(|| Arc::new(render(layout, &event)));

    let event = Arc::new(event);
    for handle in appenders {
        handle.send_event(event.clone(), rendered.clone());
    }
}

fn render(layout: &dyn Layout, event: &LogEvent) -> Result<String, Error> {
    panic::catch_unwind(AssertUnwindSafe(|| layout.format(event))).unwrap_or_else(|payload| {
        Err(Error::render("layout panicked")
            .with_context("panic", panic_message(payload.as_ref())))
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_owned()
    }
}
