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

use colored::Color;
use colored::Colorize;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Layout;
use crate::layout::basic::format_time;
use crate::record::Level;
use crate::record::LogEvent;

/// A layout that formats log events as text with the level colored.
///
/// Output format is the same as [`BasicLayout`](crate::layout::BasicLayout):
///
/// ```text
/// [2024-08-11T22:44:57.172+08:00] [ERROR] app.db - connection lost
/// ```
///
/// Whether escape codes are emitted follows the `colored` crate, which honors `NO_COLOR` and
/// `CLICOLOR_FORCE`.
#[derive(Debug, Clone, Default)]
pub struct ColoredLayout {
    colors: LevelColor,
    tz: Option<TimeZone>,
}

impl ColoredLayout {
    /// Customize the color of each log level.
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Set the timezone for timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }
}

/// Customize the color of each log level.
#[derive(Debug, Clone)]
pub struct LevelColor {
    pub fatal: Color,
    pub error: Color,
    pub warn: Color,
    pub info: Color,
    pub debug: Color,
    pub trace: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            fatal: Color::BrightMagenta,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Cyan,
            trace: Color::Blue,
        }
    }
}

impl LevelColor {
    fn color(&self, level: Level) -> Color {
        match level {
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
            Level::Trace => self.trace,
        }
    }
}

impl Layout for ColoredLayout {
    fn format(&self, event: &LogEvent) -> Result<String, Error> {
        let time = format_time(event.time(), self.tz.as_ref())?;
        let level = event.level();
        let header = format!("[{time}] [{level}] {}", event.category());
        let header = header.color(self.colors.color(level));
        let message = event.message();
        Ok(format!("{header} - {message}"))
    }
}
