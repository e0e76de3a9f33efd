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

//! Resolve layouts from their configured type name and parameters.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jiff::tz::TimeZone;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::Layout;
use crate::layout::BasicLayout;
use crate::layout::MessagePassThroughLayout;

/// The configuration of a layout: a type name plus type-specific parameters.
///
/// ```
/// use logroute::layout::LayoutSpec;
///
/// let spec: LayoutSpec =
///     serde_json::from_str(r#"{"type": "basic", "timezone": "UTC"}"#).unwrap();
/// assert_eq!(spec.kind(), "basic");
/// assert_eq!(spec.params()["timezone"], "UTC");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutSpec {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    params: Map<String, Value>,
}

impl LayoutSpec {
    /// Create a spec with no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
        }
    }

    /// Add one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The layout type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The type-specific parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

/// Resolves a [`LayoutSpec`] into a layout.
///
/// Appenders call the provider once at configuration time and keep the returned layout for
/// their whole lifetime.
pub trait LayoutProvider: fmt::Debug + Send + Sync {
    /// Build the layout described by `spec`.
    fn resolve(&self, spec: &LayoutSpec) -> Result<Arc<dyn Layout>, Error>;
}

type LayoutFactory = dyn Fn(&Map<String, Value>) -> Result<Box<dyn Layout>, Error> + Send + Sync;

/// The provider of the built-in layouts, extensible with custom types.
///
/// Recognized types:
///
/// * `basic`: [`BasicLayout`], optional `timezone` parameter (IANA name).
/// * `colored`: [`ColoredLayout`](crate::layout::ColoredLayout), same parameters as `basic`.
/// * `messagePassThrough`: [`MessagePassThroughLayout`].
///
/// # Examples
///
/// ```
/// use logroute::layout::CustomLayout;
/// use logroute::layout::DefaultLayoutProvider;
/// use logroute::layout::LayoutProvider;
/// use logroute::layout::LayoutSpec;
///
/// let provider = DefaultLayoutProvider::default().with_layout("upper", |_params| {
///     Ok(Box::new(CustomLayout::new(|event| Ok(event.message().to_uppercase()))))
/// });
/// let layout = provider.resolve(&LayoutSpec::new("upper")).unwrap();
/// ```
#[derive(Default)]
pub struct DefaultLayoutProvider {
    custom: HashMap<String, Box<LayoutFactory>>,
}

impl fmt::Debug for DefaultLayoutProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultLayoutProvider")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DefaultLayoutProvider {
    /// Register a custom layout type. A custom type shadows a built-in one of the same name.
    pub fn with_layout(
        mut self,
        kind: impl Into<String>,
        factory: impl Fn(&Map<String, Value>) -> Result<Box<dyn Layout>, Error> + Send + Sync + 'static,
    ) -> Self {
        self.custom.insert(kind.into(), Box::new(factory));
        self
    }
}

fn timezone_param(spec: &LayoutSpec) -> Result<Option<TimeZone>, Error> {
    match spec.params().get("timezone") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => TimeZone::get(name).map(Some).map_err(|err| {
            Error::config("unknown timezone")
                .with_context("layout", spec.kind())
                .with_context("timezone", name)
                .with_source(err)
        }),
        Some(other) => Err(Error::config("timezone must be a string")
            .with_context("layout", spec.kind())
            .with_context("timezone", other)),
    }
}

impl LayoutProvider for DefaultLayoutProvider {
    fn resolve(&self, spec: &LayoutSpec) -> Result<Arc<dyn Layout>, Error> {
        if let Some(factory) = self.custom.get(spec.kind()) {
            return factory(spec.params()).map(Arc::from);
        }

        match spec.kind() {
            "basic" => {
                let layout = match timezone_param(spec)? {
                    Some(tz) => BasicLayout::default().timezone(tz),
                    None => BasicLayout::default(),
                };
                Ok(Arc::new(layout))
            }
            #[cfg(feature = "colored")]
            "colored" | "coloured" => {
                let layout = crate::layout::ColoredLayout::default();
                let layout = match timezone_param(spec)? {
                    Some(tz) => layout.timezone(tz),
                    None => layout,
                };
                Ok(Arc::new(layout))
            }
            "messagePassThrough" => Ok(Arc::new(MessagePassThroughLayout::default())),
            kind => Err(Error::config("unknown layout type").with_context("type", kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CustomLayout;
    use crate::record::Level;
    use crate::record::LogEvent;

    #[test]
    fn resolve_builtin_layouts() {
        let provider = DefaultLayoutProvider::default();
        let event = LogEvent::new("app", Level::Info, "hello");

        let layout = provider
            .resolve(&LayoutSpec::new("messagePassThrough"))
            .unwrap();
        assert_eq!(layout.format(&event).unwrap(), "hello");

        let layout = provider
            .resolve(&LayoutSpec::new("basic").param("timezone", "UTC"))
            .unwrap();
        assert!(layout.format(&event).unwrap().ends_with("[INFO] app - hello"));
    }

    #[test]
    fn resolve_unknown_type_is_config_error() {
        let provider = DefaultLayoutProvider::default();
        let err = provider.resolve(&LayoutSpec::new("tester")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
        assert_eq!(err.context("type"), Some("tester"));
    }

    #[test]
    fn resolve_bad_timezone() {
        let provider = DefaultLayoutProvider::default();
        let err = provider
            .resolve(&LayoutSpec::new("basic").param("timezone", "Mars/Olympus"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);

        let err = provider
            .resolve(&LayoutSpec::new("basic").param("timezone", 8))
            .unwrap_err();
        assert_eq!(err.context("timezone"), Some("8"));
    }

    #[test]
    fn custom_type_receives_params() {
        let provider = DefaultLayoutProvider::default().with_layout("prefixed", |params| {
            let prefix = params
                .get("prefix")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            Ok(Box::new(CustomLayout::new(move |event| {
                Ok(format!("{prefix}{}", event.message()))
            })))
        });

        let spec: LayoutSpec =
            serde_json::from_str(r#"{"type": "prefixed", "prefix": ">> "}"#).unwrap();
        let layout = provider.resolve(&spec).unwrap();
        let event = LogEvent::new("app", Level::Info, "hello");
        assert_eq!(layout.format(&event).unwrap(), ">> hello");
    }
}
