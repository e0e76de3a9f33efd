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

use std::sync::LazyLock;

use crate::Registry;
use crate::dispatch::is_worker_thread;
use crate::record::Level;
use crate::registry;

/// A [`log::Log`] implementation routing records into a [`Registry`].
///
/// The record target is used as the category, so `log::warn!(target: "app.db", ..)` goes to the
/// `app.db` category and records without an explicit target go to their module path, e.g.
/// `my_crate::db`.
///
/// Records emitted on appender worker threads are discarded. They would otherwise feed an
/// appender with its own diagnostics, e.g., the debug logs of its HTTP client.
#[derive(Debug)]
pub struct LogBridge {
    registry: Registry,
}

impl LogBridge {
    /// Create a bridge feeding `registry`.
    pub fn new(registry: Registry) -> Self {
        LogBridge { registry }
    }
}

fn level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        !is_worker_thread()
            && self
                .registry
                .enabled(metadata.target(), level(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if is_worker_thread() {
            return;
        }

        self.registry.emit(
            record.target(),
            level(record.level()),
            record.args().to_string(),
        );
    }

    fn flush(&self) {
        // failures are already reported to the appender traps
        let _ = self.registry.flush();
    }
}

/// Route the `log` crate macros into the [global registry](registry::global).
///
/// # Errors
///
/// Return an error if the `log` crate global logger has already been set.
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LazyLock<LogBridge> =
        LazyLock::new(|| LogBridge::new(registry::global().clone()));
    log::set_logger(&*LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Route the `log` crate macros into the [global registry](registry::global).
///
/// # Panics
///
/// Panic if the `log` crate global logger has already been set.
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "logroute::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
