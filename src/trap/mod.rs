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

//! Traps for the diagnostics of the logging pipeline itself.
//!
//! Failures inside appenders and layouts never reach the code that emitted the event. They are
//! reported to a [`Trap`] instead.

use std::fmt;

use crate::Error;

mod default;

pub use self::default::DefaultTrap;

/// A trap that receives errors and notices raised while dispatching log events.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error that would otherwise be lost.
    fn trap(&self, err: &Error);

    /// Handle a verbose notice, e.g., a provider acknowledgment.
    ///
    /// Default to a no-op.
    fn notice(&self, message: &str) {
        let _ = message;
    }
}

impl<T: Trap> From<T> for Box<dyn Trap> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
