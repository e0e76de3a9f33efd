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

use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::Error;
use crate::Trap;
use crate::append::Append;
use crate::dispatch::IN_WORKER;
use crate::dispatch::Task;
use crate::dispatch::panic_message;
use crate::record::LogEvent;

pub(crate) struct Worker {
    name: Arc<str>,
    append: Box<dyn Append>,
    receiver: Receiver<Task>,
    trap: Arc<dyn Trap>,
}

impl Worker {
    pub(crate) fn new(
        name: Arc<str>,
        append: Box<dyn Append>,
        receiver: Receiver<Task>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        Self {
            name,
            append,
            receiver,
            trap,
        }
    }

    pub(crate) fn run(self) {
        let Self {
            name,
            append,
            receiver,
            trap,
        } = self;

        IN_WORKER.with(|flag| flag.set(true));

        while let Ok(task) = receiver.recv() {
            match task {
                Task::Log { event, rendered } => {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        deliver(append.as_ref(), &event, rendered.as_deref())
                    }));

                    let err = match result {
                        Ok(Ok(())) => continue,
                        Ok(Err(err)) => err,
                        Err(payload) => Error::unexpected("appender panicked")
                            .with_context("panic", panic_message(payload.as_ref())),
                    };
                    let err = err
                        .with_context("appender", &name)
                        .with_context("category", event.category());
                    trap.trap(&err);
                }
                Task::Flush { done } => {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| append.flush()))
                        .unwrap_or_else(|payload| {
                            Err(Error::unexpected("appender panicked")
                                .with_context("panic", panic_message(payload.as_ref())))
                        })
                        .map_err(|err| {
                            let err = Error::unexpected("failed to flush")
                                .with_context("appender", &name)
                                .with_source(err);
                            trap.trap(&err);
                            err
                        });
                    // the flushing side may have given up waiting
                    let _ = done.send(result);
                }
            }
        }
    }
}

fn deliver(
    append: &dyn Append,
    event: &LogEvent,
    rendered: Option<&Result<String, Error>>,
) -> Result<(), Error> {
    if let Some(layout) = append.layout() {
        let text = layout.format(event)?;
        return append.append(event, &text);
    }

    match rendered {
        Some(Ok(text)) => append.append(event, text),
        Some(Err(cause)) => {
            Err(Error::render("failed to render event with the category layout")
                .with_context("cause", cause))
        }
        None => Err(Error::unexpected("event was dispatched without rendered text")),
    }
}
