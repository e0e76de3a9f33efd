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

use crate::Error;
use crate::Layout;
use crate::record::LogEvent;

/// A layout that reproduces the message of the event unchanged.
///
/// # Examples
///
/// ```
/// use logroute::layout::MessagePassThroughLayout;
///
/// let layout = MessagePassThroughLayout::default();
/// ```
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct MessagePassThroughLayout {}

impl Layout for MessagePassThroughLayout {
    fn format(&self, event: &LogEvent) -> Result<String, Error> {
        Ok(event.message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;

    #[test]
    fn message_is_unchanged() {
        let layout = MessagePassThroughLayout::default();
        for message in ["", "Log event #1", "tab\there \u{1F600} \u{7}bell"] {
            let event = LogEvent::new("pass", Level::Info, message);
            assert_eq!(layout.format(&event).unwrap(), message);
        }
    }
}
