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

use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use crossbeam_channel::TrySendError;

use crate::Error;
use crate::dispatch::Overflow;
use crate::dispatch::Task;

#[derive(Debug)]
pub(crate) struct HandleState(Option<State>);

#[derive(Debug)]
struct State {
    sender: Sender<Task>,
    handle: JoinHandle<()>,
}

impl HandleState {
    pub(crate) fn new(sender: Sender<Task>, handle: JoinHandle<()>) -> Self {
        Self(Some(State { sender, handle }))
    }

    pub(crate) fn send_task(&self, task: Task, overflow: Overflow) -> Result<(), Error> {
        let Some(State { sender, .. }) = self.0.as_ref() else {
            return Err(Error::unexpected("appender worker has been shut down"));
        };

        match overflow {
            Overflow::Block => sender.send(task).map_err(|err| {
                Error::unexpected(match err.0 {
                    Task::Log { .. } => "failed to send log task to appender worker",
                    Task::Flush { .. } => "failed to send flush task to appender worker",
                })
            }),
            Overflow::DropIncoming => match sender.try_send(task) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Ok(()),
                Err(TrySendError::Disconnected(task)) => Err(Error::unexpected(match task {
                    Task::Log { .. } => "failed to send log task to appender worker",
                    Task::Flush { .. } => "failed to send flush task to appender worker",
                })),
            },
        }
    }
}

impl HandleState {
    /// Close the queue and wait until the worker processed every queued task.
    pub(crate) fn shutdown(mut self) -> Result<(), Error> {
        let Some(State { sender, handle }) = self.0.take() else {
            return Ok(());
        };

        drop(sender);
        handle
            .join()
            .map_err(|_| Error::unexpected("appender worker panicked while shutting down"))
    }
}

impl Drop for HandleState {
    fn drop(&mut self) {
        if let Some(State { sender, handle }) = self.0.take() {
            // the worker breaks its loop after draining the queue
            drop(sender);

            // detached: the last clone may be dropped on an emitting thread
            drop(handle);
        }
    }
}
