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

//! Logroute routes log events from named categories to asynchronous appenders.
//!
//! # Overview
//!
//! A [`Logger`] is bound to a category such as `app.db`. The [`Registry`] knows, for every
//! category, which appenders receive its events, the minimum level it accepts and the layout that
//! renders it. Categories without their own configuration inherit from their nearest configured
//! ancestor (`app.db` inherits from `app`), and finally from the registry defaults.
//!
//! Each appender runs on its own worker thread behind an [`AppenderHandle`]. Emitting an event
//! only queues it, so a slow appender such as [`Slack`](append::Slack) never delays the caller,
//! and a failing appender never affects the other ones. Failures are reported to a [`Trap`].
//!
//! # Examples
//!
//! ```
//! use logroute::append;
//! use logroute::dispatch::AppenderHandle;
//! use logroute::record::Level;
//!
//! let registry = logroute::registry::global();
//! let stderr = AppenderHandle::new("stderr", append::Stderr::default()).unwrap();
//! registry.set_default_appenders(vec![stderr]);
//! registry.set_level("app.db", Level::Warn);
//!
//! let logger = logroute::logger("app.db");
//! logger.warn("slow query");
//! logger.info("dropped by the level gate");
//! registry.flush().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod layout;
pub mod record;
pub mod registry;
pub mod trap;

mod error;
mod logger;

pub use self::append::Append;
pub use self::dispatch::AppenderHandle;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::layout::Layout;
pub use self::logger::Logger;
pub use self::registry::Registry;
pub use self::trap::Trap;

/// Create a logger bound to `category` in the [global registry](registry::global).
pub fn logger(category: impl Into<String>) -> Logger {
    registry::global().logger(category)
}
