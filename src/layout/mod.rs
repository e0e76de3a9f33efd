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

//! Layouts for formatting log events.

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::record::LogEvent;

mod basic;
#[cfg(feature = "colored")]
mod colored;
mod custom;
mod pass_through;
pub mod provider;

pub use self::basic::BasicLayout;
#[cfg(feature = "colored")]
pub use self::colored::ColoredLayout;
#[cfg(feature = "colored")]
pub use self::colored::LevelColor;
pub use self::custom::CustomLayout;
pub use self::pass_through::MessagePassThroughLayout;
pub use self::provider::DefaultLayoutProvider;
pub use self::provider::LayoutProvider;
pub use self::provider::LayoutSpec;

/// A layout for formatting log events.
///
/// Layouts are pure: the same event always renders to the same text.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Formats a log event.
    fn format(&self, event: &LogEvent) -> Result<String, Error>;
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

impl<T: Layout + ?Sized> Layout for Arc<T> {
    fn format(&self, event: &LogEvent) -> Result<String, Error> {
        (**self).format(event)
    }
}
