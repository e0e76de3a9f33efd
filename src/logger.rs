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

use std::sync::Arc;

use crate::Registry;
use crate::record::Level;

/// A handle bound to a category.
///
/// Emitting never blocks on appender I/O and never fails: events below the category's minimum
/// level are dropped, everything else is queued to the category's appenders.
///
/// # Examples
///
/// ```
/// let logger = logroute::logger("app.db");
/// logger.info("connected");
/// logger.warn(format!("slow query: {}ms", 1200));
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    category: Arc<str>,
    registry: Registry,
}

impl Logger {
    pub(crate) fn new(category: impl Into<String>, registry: Registry) -> Self {
        Logger {
            category: Arc::from(category.into()),
            registry,
        }
    }

    /// The category this logger emits to.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether an event at `level` would pass the category's minimum level.
    pub fn enabled(&self, level: Level) -> bool {
        self.registry.enabled(&self.category, level)
    }

    /// Emit `message` at `level`.
    pub fn emit(&self, level: Level, message: impl Into<String>) {
        self.registry.emit(&self.category, level, message);
    }

    /// Emit `message` at [`Level::Trace`].
    pub fn trace(&self, message: impl Into<String>) {
        self.emit(Level::Trace, message);
    }

    /// Emit `message` at [`Level::Debug`].
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Level::Debug, message);
    }

    /// Emit `message` at [`Level::Info`].
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message);
    }

    /// Emit `message` at [`Level::Warn`].
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Level::Warn, message);
    }

    /// Emit `message` at [`Level::Error`].
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message);
    }

    /// Emit `message` at [`Level::Fatal`].
    pub fn fatal(&self, message: impl Into<String>) {
        self.emit(Level::Fatal, message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;
    use crate::append::Append;
    use crate::dispatch::AppenderHandle;
    use crate::layout::MessagePassThroughLayout;
    use crate::record::LogEvent;

    #[derive(Debug, Default, Clone)]
    struct Levels(Arc<Mutex<Vec<Level>>>);

    impl Append for Levels {
        fn append(&self, event: &LogEvent, _: &str) -> Result<(), Error> {
            self.0.lock().unwrap().push(event.level());
            Ok(())
        }
    }

    #[test]
    fn level_gate_drops_verbose_events() {
        let registry = Registry::new();
        let seen = Levels::default();
        registry.register(
            "svc",
            vec![AppenderHandle::new("levels", seen.clone()).unwrap()],
        );
        registry.set_level("svc", Level::Warn);
        registry.set_default_layout(MessagePassThroughLayout::default());

        let logger = registry.logger("svc.worker");
        assert_eq!(logger.category(), "svc.worker");
        assert!(logger.enabled(Level::Error));
        assert!(!logger.enabled(Level::Info));

        logger.trace("t");
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");
        logger.fatal("f");
        registry.flush().unwrap();

        assert_eq!(
            *seen.0.lock().unwrap(),
            [Level::Warn, Level::Error, Level::Fatal]
        );
    }

    #[test]
    fn emitting_without_appenders_is_a_no_op() {
        let registry = Registry::new();
        let logger = registry.logger("nobody.listens");
        logger.fatal("lost");
        registry.flush().unwrap();
    }
}
