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

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::Trap;
use crate::append::Append;
use crate::dispatch::Rendered;
use crate::dispatch::Task;
use crate::dispatch::state::HandleState;
use crate::dispatch::worker::Worker;
use crate::record::LogEvent;
use crate::trap::DefaultTrap;

/// Overflow policy for [`AppenderHandle`].
///
/// When a bounded queue is full, an incoming event is handled according to the specified policy.
/// Unbounded queues never overflow.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Overflow {
    /// Blocks until the queue is not full.
    Block,
    /// Drops the incoming event.
    DropIncoming,
}

/// A shared handle to an appender running on its own worker thread.
///
/// Cloning is cheap, and all clones feed the same worker, so one appender instance can be
/// attached to many categories. Events sent through a handle are delivered in the order they
/// were sent. Once the last clone is dropped the worker processes the events already queued and
/// exits in the background; use [`AppenderHandle::shutdown`] to wait for it.
///
/// # Examples
///
/// ```
/// use logroute::append::Stderr;
/// use logroute::dispatch::AppenderHandle;
///
/// let handle = AppenderHandle::new("stderr", Stderr::default()).unwrap();
/// assert_eq!(handle.name(), "stderr");
/// ```
#[derive(Clone)]
pub struct AppenderHandle(Arc<Inner>);

struct Inner {
    name: Arc<str>,
    overrides_layout: bool,
    overflow: Overflow,
    trap: Arc<dyn Trap>,
    state: HandleState,
}

impl fmt::Debug for AppenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppenderHandle")
            .field("name", &self.0.name)
            .field("overrides_layout", &self.0.overrides_layout)
            .field("overflow", &self.0.overflow)
            .finish_non_exhaustive()
    }
}

impl AppenderHandle {
    /// Start a worker for `append` with an unbounded queue and the [`DefaultTrap`].
    ///
    /// # Errors
    ///
    /// Return an error if the worker thread can not be spawned.
    pub fn new(name: impl Into<String>, append: impl Into<Box<dyn Append>>) -> Result<Self, Error> {
        Self::builder(name).build(append)
    }

    /// Create a builder for customizing the worker.
    pub fn builder(name: impl Into<String>) -> HandleBuilder {
        HandleBuilder::new(name)
    }

    /// The name of the appender.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether two handles feed the same worker.
    pub fn same_worker(&self, other: &AppenderHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Block until every event sent before this call has been processed, then flush the appender.
    ///
    /// # Errors
    ///
    /// Return an error if the worker is gone or the appender failed to flush.
    pub fn flush(&self) -> Result<(), Error> {
        let (done, wait) = oneshot::channel();
        self.0.state.send_task(Task::Flush { done }, Overflow::Block)?;
        wait.recv().map_err(|err| {
            Error::unexpected("appender worker exited before flushing")
                .with_context("appender", self.name())
                .with_source(err)
        })?
    }

    /// Release this handle and wait for the worker.
    ///
    /// If this is the last clone, the queue is closed and the call blocks until the worker
    /// processed every queued event and exited. Otherwise it behaves like
    /// [`AppenderHandle::flush`].
    ///
    /// # Errors
    ///
    /// Return an error if the worker is gone, panicked, or the appender failed to flush.
    pub fn shutdown(self) -> Result<(), Error> {
        match Arc::try_unwrap(self.0) {
            Ok(inner) => inner.state.shutdown(),
            Err(shared) => AppenderHandle(shared).flush(),
        }
    }

    pub(crate) fn overrides_layout(&self) -> bool {
        self.0.overrides_layout
    }

    pub(crate) fn send_event(&self, event: Arc<LogEvent>, rendered: Option<Rendered>) {
        let task = Task::Log { event, rendered };
        if let Err(err) = self.0.state.send_task(task, self.0.overflow) {
            self.0.trap.trap(&err.with_context("appender", self.name()));
        }
    }
}

/// A builder for configuring an [`AppenderHandle`].
pub struct HandleBuilder {
    name: String,
    buffered_events_limit: Option<usize>,
    overflow: Overflow,
    trap: Arc<dyn Trap>,
}

impl fmt::Debug for HandleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleBuilder")
            .field("name", &self.name)
            .field("buffered_events_limit", &self.buffered_events_limit)
            .field("overflow", &self.overflow)
            .field("trap", &self.trap)
            .finish()
    }
}

impl HandleBuilder {
    /// Create a new handle builder.
    pub fn new(name: impl Into<String>) -> HandleBuilder {
        HandleBuilder {
            name: name.into(),
            buffered_events_limit: None,
            overflow: Overflow::Block,
            trap: Arc::new(DefaultTrap::default()),
        }
    }

    /// Set the capacity of the queue. `None` means unbounded.
    pub fn buffered_events_limit(mut self, buffered_events_limit: Option<usize>) -> Self {
        self.buffered_events_limit = buffered_events_limit;
        self
    }

    /// Set the overflow policy to block when the queue is full.
    ///
    /// A blocked emitter waits for the appender, so prefer [`HandleBuilder::overflow_drop_incoming`]
    /// for slow appenders.
    pub fn overflow_block(mut self) -> Self {
        self.overflow = Overflow::Block;
        self
    }

    /// Set the overflow policy to drop incoming events when the queue is full.
    pub fn overflow_drop_incoming(mut self) -> Self {
        self.overflow = Overflow::DropIncoming;
        self
    }

    /// Set the trap receiving delivery failures of this appender.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = Arc::from(trap.into());
        self
    }

    /// Spawn the worker thread and return its handle.
    ///
    /// # Errors
    ///
    /// Return an error if the worker thread can not be spawned.
    pub fn build(self, append: impl Into<Box<dyn Append>>) -> Result<AppenderHandle, Error> {
        let Self {
            name,
            buffered_events_limit,
            overflow,
            trap,
        } = self;

        let append = append.into();
        let overrides_layout = append.layout().is_some();
        let name: Arc<str> = Arc::from(name);

        let (sender, receiver) = match buffered_events_limit {
            Some(limit) => crossbeam_channel::bounded(limit),
            None => crossbeam_channel::unbounded(),
        };

        let worker = Worker::new(name.clone(), append, receiver, trap.clone());
        let handle = std::thread::Builder::new()
            .name(format!("logroute-{name}"))
            .spawn(move || worker.run())
            .map_err(|err| {
                Error::unexpected("failed to spawn appender worker")
                    .with_context("appender", &name)
                    .with_source(err)
            })?;

        Ok(AppenderHandle(Arc::new(Inner {
            name,
            overrides_layout,
            overflow,
            trap,
            state: HandleState::new(sender, handle),
        })))
    }
}
