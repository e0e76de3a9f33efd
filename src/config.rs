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

//! Describe appenders and categories as data and apply them to a [`Registry`] at once.
//!
//! ```
//! use logroute::Registry;
//! use logroute::config::Config;
//! use logroute::layout::DefaultLayoutProvider;
//!
//! let config: Config = r#"{
//!     "appenders": {
//!         "out": { "type": "stdout", "layout": { "type": "basic" } }
//!     },
//!     "categories": {
//!         "default": { "appenders": ["out"], "level": "info" },
//!         "app.db": { "appenders": ["out"], "level": "warn" }
//!     }
//! }"#
//! .parse()
//! .unwrap();
//!
//! let registry = Registry::new();
//! registry.configure(&config, &DefaultLayoutProvider::default()).unwrap();
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;
use crate::Registry;
use crate::append::Stderr;
use crate::append::Stdout;
use crate::append::slack::SlackConfig;
use crate::dispatch::AppenderHandle;
use crate::layout::LayoutProvider;
use crate::layout::LayoutSpec;
use crate::record::LevelFilter;
use crate::registry::Snapshot;

/// The name of the category holding the registry defaults.
pub const DEFAULT_CATEGORY: &str = "default";

/// A complete description of a registry.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Appenders by name.
    #[serde(default)]
    pub appenders: BTreeMap<String, AppenderConfig>,
    /// Categories by name. The [`DEFAULT_CATEGORY`] entry configures the defaults.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
}

/// The options of one appender, tagged by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[non_exhaustive]
pub enum AppenderConfig {
    /// Write to standard output.
    Stdout {
        /// Override the category layout.
        #[serde(default)]
        layout: Option<LayoutSpec>,
    },
    /// Write to standard error.
    Stderr {
        /// Override the category layout.
        #[serde(default)]
        layout: Option<LayoutSpec>,
    },
    /// Post to a Slack channel.
    Slack(SlackConfig),
}

/// The options of one category.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CategoryConfig {
    /// Names of the appenders, in invocation order.
    #[serde(default)]
    pub appenders: Vec<String>,
    /// The minimum level, e.g. `"warn"`, `"all"` or `"off"`.
    #[serde(default)]
    pub level: Option<LevelFilter>,
    /// The layout for appenders without their own.
    #[serde(default)]
    pub layout: Option<LayoutSpec>,
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|err| Error::config("malformed configuration").with_source(err))
    }
}

impl AppenderConfig {
    fn build(&self, name: &str, provider: &dyn LayoutProvider) -> Result<AppenderHandle, Error> {
        match self {
            AppenderConfig::Stdout { layout } => {
                let mut append = Stdout::default();
                if let Some(spec) = layout {
                    append = append.with_layout(provider.resolve(spec)?);
                }
                AppenderHandle::new(name, append)
            }
            AppenderConfig::Stderr { layout } => {
                let mut append = Stderr::default();
                if let Some(spec) = layout {
                    append = append.with_layout(provider.resolve(spec)?);
                }
                AppenderHandle::new(name, append)
            }
            #[cfg(feature = "append-slack-web-api")]
            AppenderConfig::Slack(config) => {
                let append = crate::append::Slack::configure(config.clone(), provider)?;
                AppenderHandle::new(name, append)
            }
            #[cfg(not(feature = "append-slack-web-api"))]
            AppenderConfig::Slack(_) => Err(Error::config(
                "slack appender requires the append-slack-web-api feature",
            )),
        }
    }
}

impl Registry {
    /// Replace the whole configuration of the registry.
    ///
    /// Every appender and layout is built first. If anything fails the registry is left
    /// untouched, otherwise the new configuration becomes visible to all loggers at once.
    ///
    /// # Errors
    ///
    /// Return a config error if an appender or layout can not be built, or a category refers to
    /// an appender that is not declared.
    pub fn configure(&self, config: &Config, provider: &dyn LayoutProvider) -> Result<(), Error> {
        let mut handles = HashMap::with_capacity(config.appenders.len());
        for (name, appender) in &config.appenders {
            let handle = appender
                .build(name, provider)
                .map_err(|err| err.with_context("appender", name))?;
            handles.insert(name.as_str(), handle);
        }

        let mut snapshot = Snapshot::default();
        for (name, category) in &config.categories {
            let appenders = category
                .appenders
                .iter()
                .map(|appender| {
                    handles.get(appender.as_str()).cloned().ok_or_else(|| {
                        Error::config("category refers to an unknown appender")
                            .with_context("category", name)
                            .with_context("appender", appender)
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let layout = match &category.layout {
                Some(spec) => Some(
                    provider
                        .resolve(spec)
                        .map_err(|err| err.with_context("category", name))?,
                ),
                None => None,
            };

            if name == DEFAULT_CATEGORY {
                let defaults = snapshot.defaults_mut();
                defaults.set_appenders(appenders);
                if let Some(level) = category.level {
                    defaults.set_level(level);
                }
                if let Some(layout) = layout {
                    defaults.set_layout(layout);
                }
            } else {
                let entry = snapshot.category_mut(name);
                entry.set_appenders(appenders);
                if let Some(level) = category.level {
                    entry.set_level(level);
                }
                if let Some(layout) = layout {
                    entry.set_layout(layout);
                }
            }
        }

        self.replace(snapshot);
        Ok(())
    }
}
