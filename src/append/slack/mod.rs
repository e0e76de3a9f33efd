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

//! An appender that posts each log event to a Slack channel.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Layout;
use crate::Trap;
use crate::append::Append;
use crate::layout::LayoutProvider;
use crate::layout::LayoutSpec;
use crate::layout::MessagePassThroughLayout;
use crate::record::LogEvent;
use crate::trap::DefaultTrap;

mod transport;

pub use self::transport::Acknowledgment;
pub use self::transport::Transport;
#[cfg(feature = "append-slack-web-api")]
pub use self::transport::WebApiTransport;
#[cfg(feature = "append-slack-web-api")]
pub use self::transport::WebApiTransportBuilder;

/// Options of the [`Slack`] appender.
///
/// Keys not listed here (for example a legacy `format`) are ignored.
///
/// ```
/// use logroute::append::slack::SlackConfig;
///
/// let config: SlackConfig = serde_json::from_str(
///     r##"{"token": "xoxb-1", "channel_id": "#ops", "username": "logbot"}"##,
/// )
/// .unwrap();
/// assert_eq!(config.channel_id, "#ops");
/// assert!(config.layout.is_none());
/// ```
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct SlackConfig {
    /// The bot token used by the transport.
    #[serde(default)]
    pub token: String,
    /// The destination channel, e.g. `#ops` or a channel ID.
    #[serde(default)]
    pub channel_id: String,
    /// The name the messages are posted as.
    #[serde(default)]
    pub username: String,
    /// The avatar of the poster.
    #[serde(default)]
    pub icon_url: Option<String>,
    /// The layout of the message text. Default to `messagePassThrough`.
    #[serde(default)]
    pub layout: Option<LayoutSpec>,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("username", &self.username)
            .field("icon_url", &self.icon_url)
            .field("layout", &self.layout)
            .finish()
    }
}

impl SlackConfig {
    fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("token", &self.token),
            ("channel_id", &self.channel_id),
            ("username", &self.username),
        ] {
            if value.trim().is_empty() {
                return Err(
                    Error::config("missing required slack option").with_context("option", name)
                );
            }
        }
        Ok(())
    }
}

/// The payload of one Slack message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage<'a> {
    /// The destination channel.
    pub channel: &'a str,
    /// The name the message is posted as.
    pub username: &'a str,
    /// The rendered event.
    pub text: &'a str,
    /// The avatar of the poster, omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<&'a str>,
}

impl SlackMessage<'_> {
    /// The JSON form of this payload, as sent over the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// An appender that delivers every log event as a separate Slack message.
///
/// Events are never batched: each call to [`Append::append`] performs exactly one
/// [`Transport::send`]. Delivery failures are returned as [`ErrorKind::Delivery`] errors
/// carrying the payload, so the dispatching worker reports them to its trap.
///
/// [`ErrorKind::Delivery`]: crate::ErrorKind::Delivery
///
/// # Examples
///
/// ```no_run
/// use logroute::append::Slack;
/// use logroute::append::slack::SlackConfig;
/// use logroute::layout::DefaultLayoutProvider;
///
/// let config = SlackConfig {
///     token: "xoxb-token".to_string(),
///     channel_id: "#ops".to_string(),
///     username: "logbot".to_string(),
///     ..Default::default()
/// };
/// let slack = Slack::configure(config, &DefaultLayoutProvider::default()).unwrap();
/// ```
pub struct Slack {
    channel: String,
    username: String,
    icon_url: Option<String>,
    layout: Arc<dyn Layout>,
    transport: Box<dyn Transport>,
    trap: Box<dyn Trap>,
}

impl fmt::Debug for Slack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slack")
            .field("channel", &self.channel)
            .field("username", &self.username)
            .field("icon_url", &self.icon_url)
            .field("layout", &self.layout)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Slack {
    /// Create a Slack appender posting through the Slack Web API.
    ///
    /// # Errors
    ///
    /// Return a config error if a required option is missing, the layout can not be resolved or
    /// the HTTP client can not be built.
    #[cfg(feature = "append-slack-web-api")]
    pub fn configure(config: SlackConfig, provider: &dyn LayoutProvider) -> Result<Slack, Error> {
        config.validate()?;
        let transport = WebApiTransport::new(config.token.clone())?;
        Self::with_transport(config, provider, transport)
    }

    /// Create a Slack appender posting through the given transport.
    ///
    /// When `config.layout` is set, `provider` is asked exactly once for the layout, which is then
    /// used for every event. Otherwise the message is passed through unchanged.
    ///
    /// # Errors
    ///
    /// Return a config error if a required option is missing or the layout can not be resolved.
    pub fn with_transport(
        config: SlackConfig,
        provider: &dyn LayoutProvider,
        transport: impl Into<Box<dyn Transport>>,
    ) -> Result<Slack, Error> {
        config.validate()?;

        let layout: Arc<dyn Layout> = match &config.layout {
            Some(spec) => provider.resolve(spec)?,
            None => Arc::new(MessagePassThroughLayout::default()),
        };

        let SlackConfig {
            channel_id,
            username,
            icon_url,
            ..
        } = config;

        Ok(Slack {
            channel: channel_id,
            username,
            icon_url,
            layout,
            transport: transport.into(),
            trap: Box::new(DefaultTrap::default()),
        })
    }

    /// Set the trap receiving provider acknowledgments.
    ///
    /// Default to [`DefaultTrap`], which drops them.
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }
}

impl Append for Slack {
    fn append(&self, event: &LogEvent, text: &str) -> Result<(), Error> {
        let message = SlackMessage {
            channel: &self.channel,
            username: &self.username,
            text,
            icon_url: self.icon_url.as_deref(),
        };

        match self.transport.send(&message) {
            Ok(ack) => {
                self.trap.notice(&format!(
                    "slack acknowledged message to {}: {ack}",
                    self.channel
                ));
                Ok(())
            }
            Err(err) => Err(Error::delivery("failed to send log event to slack")
                .with_context("category", event.category())
                .with_context("payload", message.to_json())
                .with_source(err)),
        }
    }

    fn layout(&self) -> Option<&dyn Layout> {
        Some(self.layout.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::ErrorKind;
    use crate::layout::DefaultLayoutProvider;
    use crate::record::Level;

    #[derive(Debug, Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Transport for Arc<Recorder> {
        fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error> {
            self.sent.lock().unwrap().push(message.to_json());
            if self.fail {
                Err(Error::delivery("channel_not_found"))
            } else {
                Ok(Acknowledgment::new(json!({"ok": true})))
            }
        }
    }

    fn config() -> SlackConfig {
        SlackConfig {
            token: "TOKEN".to_string(),
            channel_id: "#CHANNEL".to_string(),
            username: "USERNAME".to_string(),
            icon_url: Some("ICON_URL".to_string()),
            layout: None,
        }
    }

    #[test]
    fn missing_required_options_fail_fast() {
        let provider = DefaultLayoutProvider::default();
        for option in ["token", "channel_id", "username"] {
            let mut config = config();
            match option {
                "token" => config.token.clear(),
                "channel_id" => config.channel_id = "  ".to_string(),
                _ => config.username.clear(),
            }
            let err = Slack::with_transport(config, &provider, Arc::new(Recorder::default()))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert_eq!(err.context("option"), Some(option));
        }
    }

    #[test]
    fn payload_carries_configured_fields() {
        let recorder = Arc::new(Recorder::default());
        let slack = Slack::with_transport(
            config(),
            &DefaultLayoutProvider::default(),
            recorder.clone(),
        )
        .unwrap();

        let event = LogEvent::new("slack", Level::Info, "Log event #1");
        let text = slack.layout().unwrap().format(&event).unwrap();
        slack.append(&event, &text).unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            [r##"{"channel":"#CHANNEL","username":"USERNAME","text":"Log event #1","icon_url":"ICON_URL"}"##]
        );
    }

    #[test]
    fn icon_url_is_omitted_when_unset() {
        let message = SlackMessage {
            channel: "#ops",
            username: "bot",
            text: "",
            icon_url: None,
        };
        assert_eq!(message.to_json(), r##"{"channel":"#ops","username":"bot","text":""}"##);
    }

    #[test]
    fn failed_send_is_delivery_error_with_payload() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let slack = Slack::with_transport(
            config(),
            &DefaultLayoutProvider::default(),
            recorder.clone(),
        )
        .unwrap();

        let event = LogEvent::new("slack", Level::Error, "boom");
        let err = slack.append(&event, "boom").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Delivery);
        assert_eq!(err.context("category"), Some("slack"));
        assert!(err.context("payload").unwrap().contains(r#""text":"boom""#));
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[test]
    fn debug_redacts_token() {
        let text = format!("{:?}", config());
        assert!(!text.contains("TOKEN"));
        assert!(text.contains("#CHANNEL"));
    }
}
