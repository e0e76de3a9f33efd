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

//! Dispatch log events to various targets.

use std::fmt;

use crate::Error;
use crate::Layout;
use crate::record::LogEvent;

pub mod slack;
mod stdio;

pub use self::slack::Slack;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;

/// An appender that can process log events.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Dispatch a log event to the append target.
    ///
    /// `text` is the event rendered by [`Append::layout`] if the appender has one, or by the
    /// layout of the event's category otherwise.
    fn append(&self, event: &LogEvent, text: &str) -> Result<(), Error>;

    /// The layout overriding the category layout for this appender.
    ///
    /// Default to `None`.
    fn layout(&self) -> Option<&dyn Layout> {
        None
    }

    /// Flush any buffered events.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
