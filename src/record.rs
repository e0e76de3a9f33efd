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

//! Log events, levels and level filters.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Deserializer;

use crate::Error;

/// A log event emitted by a [`Logger`](crate::Logger).
///
/// Events are immutable once built and are shared between appender workers.
#[derive(Clone, Debug)]
pub struct LogEvent {
    time: SystemTime,
    category: String,
    level: Level,
    message: String,
}

impl LogEvent {
    /// Create a new event observed now.
    pub fn new(category: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self::with_time(SystemTime::now(), category, level, message)
    }

    /// Create a new event observed at the given time.
    pub fn with_time(
        time: SystemTime,
        category: impl Into<String>,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        Self {
            time,
            category: category.into(),
            level,
            message: message.into(),
        }
    }

    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.time
    }

    /// The category the event was emitted to.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The verbosity level of the event.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An enum representing the available verbosity levels of the logger.
///
/// Variants are declared from the most severe to the most verbose, so `Level::Fatal` compares
/// as the smallest value.
#[repr(usize)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Level {
    /// Designates errors after which the application can not go on.
    Fatal,
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("fatal", Level::Fatal),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
            ("trace", Level::Trace),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::config(format!("malformed level: {s:?}")))
    }
}

/// The minimum level a category accepts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Disables all levels.
    Off,
    /// Enables if the event level is more severe than or equal to the filter level.
    MoreSevereEqual(Level),
    /// Enables all levels.
    All,
}

impl LevelFilter {
    /// Checks the given level if satisfies the filter condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use logroute::record::Level;
    /// use logroute::record::LevelFilter;
    ///
    /// let level_filter = LevelFilter::MoreSevereEqual(Level::Info);
    ///
    /// assert_eq!(level_filter.test(Level::Trace), false);
    /// assert_eq!(level_filter.test(Level::Info), true);
    /// assert_eq!(level_filter.test(Level::Fatal), true);
    /// ```
    pub fn test(&self, level: Level) -> bool {
        match self {
            LevelFilter::Off => false,
            LevelFilter::MoreSevereEqual(l) => level <= *l,
            LevelFilter::All => true,
        }
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::MoreSevereEqual(level)
    }
}

impl FromStr for LevelFilter {
    type Err = Error;
    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            Ok(LevelFilter::Off)
        } else if s.eq_ignore_ascii_case("all") {
            Ok(LevelFilter::All)
        } else {
            Level::from_str(s).map(LevelFilter::MoreSevereEqual)
        }
    }
}

impl<'de> Deserialize<'de> for LevelFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        LevelFilter::from_str(&s).map_err(serde::de::Error::custom)
    }
}
