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

use std::fmt::Debug;
use std::fmt::Formatter;

use crate::Error;
use crate::Layout;
use crate::record::LogEvent;

type FormatFunction = dyn Fn(&LogEvent) -> Result<String, Error> + Send + Sync + 'static;

/// A layout that you can pass the custom layout function.
///
/// The custom layout function accepts [`&LogEvent`][LogEvent] and returns the formatted text.
/// For example:
///
/// ```rust
/// use logroute::layout::CustomLayout;
/// use logroute::record::LogEvent;
///
/// let layout = CustomLayout::new(|event: &LogEvent| {
///     Ok(format!("{} - {}", event.level(), event.message()))
/// });
/// ```
pub struct CustomLayout {
    f: Box<FormatFunction>,
}

impl Debug for CustomLayout {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "CustomLayout {{ ... }}")
    }
}

impl CustomLayout {
    pub fn new(
        layout: impl Fn(&LogEvent) -> Result<String, Error> + Send + Sync + 'static,
    ) -> Self {
        CustomLayout {
            f: Box::new(layout),
        }
    }
}

impl Layout for CustomLayout {
    fn format(&self, event: &LogEvent) -> Result<String, Error> {
        (self.f)(event)
    }
}
