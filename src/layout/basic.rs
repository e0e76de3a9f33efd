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

use std::time::SystemTime;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Layout;
use crate::record::LogEvent;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3f%:z";

/// A layout that formats log events as plain text.
///
/// Output format:
///
/// ```text
/// [2024-08-11T22:44:57.172+08:00] [ERROR] app.db - connection lost
/// [2024-08-11T22:44:57.172+08:00] [WARN] app.db - slow query
/// [2024-08-11T22:44:57.172+08:00] [INFO] app - started
/// ```
///
/// The timestamp is rendered in the system timezone unless [`BasicLayout::timezone`] is set.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use logroute::layout::BasicLayout;
///
/// let layout = BasicLayout::default().timezone(TimeZone::UTC);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasicLayout {
    tz: Option<TimeZone>,
}

impl BasicLayout {
    /// Set the timezone for timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

pub(crate) fn format_time(time: SystemTime, tz: Option<&TimeZone>) -> Result<String, Error> {
    let ts = Timestamp::try_from(time)
        .map_err(|err| Error::render("failed to convert event time").with_source(err))?;
    let tz = match tz {
        Some(tz) => tz.clone(),
        None => TimeZone::system(),
    };
    Ok(ts.to_zoned(tz).strftime(TIME_FORMAT).to_string())
}

impl Layout for BasicLayout {
    fn format(&self, event: &LogEvent) -> Result<String, Error> {
        let time = format_time(event.time(), self.tz.as_ref())?;
        let level = event.level();
        let category = event.category();
        let message = event.message();
        Ok(format!("[{time}] [{level}] {category} - {message}"))
    }
}
