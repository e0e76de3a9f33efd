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

//! The category registry.
//!
//! A [`Registry`] maps category names to their appenders, minimum level and layout. Lookups fall
//! back to the nearest configured ancestor, then to the registry defaults. Category names are
//! split on `.`, `/` and `::`, so `app.db`, `app/db` and `app::db` are all children of `app`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::Mutex;
use std::sync::PoisonError;

use arc_swap::ArcSwap;

use crate::Error;
use crate::Layout;
use crate::Logger;
use crate::dispatch::AppenderHandle;
use crate::dispatch::dispatch;
use crate::layout::BasicLayout;
use crate::record::Level;
use crate::record::LevelFilter;
use crate::record::LogEvent;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Return the process-wide registry.
///
/// The registry is created empty on first use; configure it with [`Registry::configure`] or the
/// individual setters.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// A mapping from category names to their configuration.
///
/// Cloning a registry is cheap and the clones share the same state. Readers never block: every
/// lookup works on an immutable snapshot, and writers publish a modified copy.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

struct Shared {
    snapshot: ArcSwap<Snapshot>,
    // serializes copy-modify-store writers
    writer: Mutex<()>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.shared.snapshot.load();
        f.debug_struct("Registry")
            .field("categories", &snapshot.categories)
            .field("defaults", &snapshot.defaults)
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Snapshot {
    categories: HashMap<String, Category>,
    defaults: Defaults,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Category {
    appenders: Vec<AppenderHandle>,
    level: Option<LevelFilter>,
    layout: Option<Arc<dyn Layout>>,
}

#[derive(Clone, Debug)]
pub(crate) struct Defaults {
    appenders: Vec<AppenderHandle>,
    level: LevelFilter,
    layout: Arc<dyn Layout>,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            appenders: vec![],
            level: LevelFilter::All,
            layout: Arc::new(BasicLayout::default()),
        }
    }
}

impl Snapshot {
    pub(crate) fn category_mut(&mut self, category: &str) -> &mut Category {
        self.categories.entry(category.to_owned()).or_default()
    }

    pub(crate) fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    fn appenders(&self, category: &str) -> &[AppenderHandle] {
        ancestors(category)
            .filter_map(|name| self.categories.get(name))
            .map(|c| c.appenders.as_slice())
            .find(|appenders| !appenders.is_empty())
            .unwrap_or(&self.defaults.appenders)
    }

    fn level(&self, category: &str) -> LevelFilter {
        ancestors(category)
            .filter_map(|name| self.categories.get(name))
            .find_map(|c| c.level)
            .unwrap_or(self.defaults.level)
    }

    fn layout(&self, category: &str) -> &Arc<dyn Layout> {
        ancestors(category)
            .filter_map(|name| self.categories.get(name))
            .find_map(|c| c.layout.as_ref())
            .unwrap_or(&self.defaults.layout)
    }

    fn handles(&self) -> Vec<AppenderHandle> {
        let mut handles: Vec<AppenderHandle> = vec![];
        let all = self
            .categories
            .values()
            .flat_map(|c| c.appenders.iter())
            .chain(self.defaults.appenders.iter());
        for handle in all {
            if !handles.iter().any(|h| h.same_worker(handle)) {
                handles.push(handle.clone());
            }
        }
        handles
    }
}

impl Category {
    pub(crate) fn set_appenders(&mut self, appenders: Vec<AppenderHandle>) {
        self.appenders = appenders;
    }

    pub(crate) fn set_level(&mut self, level: LevelFilter) {
        self.level = Some(level);
    }

    pub(crate) fn set_layout(&mut self, layout: Arc<dyn Layout>) {
        self.layout = Some(layout);
    }
}

impl Defaults {
    pub(crate) fn set_appenders(&mut self, appenders: Vec<AppenderHandle>) {
        self.appenders = appenders;
    }

    pub(crate) fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
    }

    pub(crate) fn set_layout(&mut self, layout: Arc<dyn Layout>) {
        self.layout = layout;
    }
}

/// The effective configuration of a category.
#[derive(Clone, Debug)]
pub struct Resolved {
    /// The appenders receiving events of the category, in invocation order.
    pub appenders: Vec<AppenderHandle>,
    /// The minimum level of the category.
    pub level: LevelFilter,
    /// The layout rendering events for appenders without their own layout.
    pub layout: Arc<dyn Layout>,
}

impl Registry {
    /// Create an empty registry.
    ///
    /// The defaults are no appenders, [`LevelFilter::All`] and [`BasicLayout`].
    pub fn new() -> Self {
        Registry {
            shared: Arc::new(Shared {
                snapshot: ArcSwap::from_pointee(Snapshot::default()),
                writer: Mutex::new(()),
            }),
        }
    }

    /// Set the appenders of `category`, replacing the previous ones.
    ///
    /// An empty list makes the category inherit the appenders of its ancestors again.
    ///
    /// # Examples
    ///
    /// ```
    /// use logroute::Registry;
    /// use logroute::append::Stdout;
    /// use logroute::dispatch::AppenderHandle;
    ///
    /// let registry = Registry::new();
    /// let stdout = AppenderHandle::new("stdout", Stdout::default()).unwrap();
    /// registry.register("app", vec![stdout]);
    ///
    /// assert_eq!(registry.resolve("app.db").appenders[0].name(), "stdout");
    /// ```
    pub fn register(&self, category: impl AsRef<str>, appenders: Vec<AppenderHandle>) {
        self.update(|snapshot| {
            snapshot
                .category_mut(category.as_ref())
                .set_appenders(appenders)
        });
    }

    /// Set the minimum level of `category`.
    pub fn set_level(&self, category: impl AsRef<str>, level: impl Into<LevelFilter>) {
        let level = level.into();
        self.update(|snapshot| snapshot.category_mut(category.as_ref()).set_level(level));
    }

    /// Set the layout of `category`.
    pub fn set_layout(&self, category: impl AsRef<str>, layout: impl Into<Box<dyn Layout>>) {
        let layout: Arc<dyn Layout> = Arc::from(layout.into());
        self.update(|snapshot| snapshot.category_mut(category.as_ref()).set_layout(layout));
    }

    /// Set the appenders used by categories without any configured ancestor.
    pub fn set_default_appenders(&self, appenders: Vec<AppenderHandle>) {
        self.update(|snapshot| snapshot.defaults_mut().set_appenders(appenders));
    }

    /// Set the minimum level used by categories without any configured ancestor.
    pub fn set_default_level(&self, level: impl Into<LevelFilter>) {
        let level = level.into();
        self.update(|snapshot| snapshot.defaults_mut().set_level(level));
    }

    /// Set the layout used by categories without any configured ancestor.
    pub fn set_default_layout(&self, layout: impl Into<Box<dyn Layout>>) {
        let layout: Arc<dyn Layout> = Arc::from(layout.into());
        self.update(|snapshot| snapshot.defaults_mut().set_layout(layout));
    }

    /// Resolve the effective configuration of `category`.
    ///
    /// Appenders, level and layout are looked up independently: each comes from the category
    /// itself, its nearest ancestor that configures it, or the defaults.
    pub fn resolve(&self, category: &str) -> Resolved {
        let snapshot = self.shared.snapshot.load();
        Resolved {
            appenders: snapshot.appenders(category).to_vec(),
            level: snapshot.level(category),
            layout: snapshot.layout(category).clone(),
        }
    }

    /// Remove every category and reset the defaults.
    ///
    /// Appender workers shut down once no logger holds on to them anymore.
    pub fn clear(&self) {
        self.replace(Snapshot::default());
    }

    /// Create a logger bound to `category`.
    pub fn logger(&self, category: impl Into<String>) -> Logger {
        Logger::new(category, self.clone())
    }

    /// Block until every appender known to the registry processed its queued events.
    ///
    /// # Errors
    ///
    /// Return the first error if any appender failed to flush. All appenders are flushed anyway.
    pub fn flush(&self) -> Result<(), Error> {
        let handles = self.shared.snapshot.load().handles();
        let mut result = Ok(());
        for handle in handles {
            if let Err(err) = handle.flush() {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    pub(crate) fn enabled(&self, category: &str, level: Level) -> bool {
        self.shared.snapshot.load().level(category).test(level)
    }

    pub(crate) fn emit(&self, category: &str, level: Level, message: impl Into<String>) {
        let snapshot = self.shared.snapshot.load_full();
        if !snapshot.level(category).test(level) {
            return;
        }

        let appenders = snapshot.appenders(category);
        if appenders.is_empty() {
            return;
        }

        let event = LogEvent::new(category, level, message);
        dispatch(event, snapshot.layout(category).as_ref(), appenders);
    }

    pub(crate) fn replace(&self, snapshot: Snapshot) {
        let _guard = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.shared.snapshot.store(Arc::new(snapshot));
    }

    fn update(&self, f: impl FnOnce(&mut Snapshot)) {
        let _guard = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = Snapshot::clone(&self.shared.snapshot.load());
        f(&mut snapshot);
        self.shared.snapshot.store(Arc::new(snapshot));
    }
}

/// Iterate `category` and then its ancestors, nearest first.
fn ancestors(category: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(category), |name| parent(*name))
}

fn parent(category: &str) -> Option<&str> {
    let dot = category.rfind('.');
    let slash = category.rfind('/');
    let colons = category.rfind("::");
    let end = [dot, slash, colons].into_iter().flatten().max()?;
    Some(&category[..end])
}
