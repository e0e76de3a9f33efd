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

use std::fmt;

use serde_json::Value;

use crate::Error;
use crate::append::slack::SlackMessage;

/// The acknowledgment returned by a [`Transport`] after a successful send.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgment(Value);

impl Acknowledgment {
    /// Wrap a provider response.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw provider response.
    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for Acknowledgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A client able to deliver one [`SlackMessage`].
///
/// Implementations block until the provider answered or the call failed. Timeouts are the
/// transport's concern.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Send one message.
    fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error>;
}

impl<T: Transport> From<T> for Box<dyn Transport> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

#[cfg(feature = "append-slack-web-api")]
pub use self::web_api::WebApiTransport;
#[cfg(feature = "append-slack-web-api")]
pub use self::web_api::WebApiTransportBuilder;

#[cfg(feature = "append-slack-web-api")]
mod web_api {
    use std::fmt;
    use std::time::Duration;

    use serde_json::Value;

    use super::Acknowledgment;
    use super::Transport;
    use crate::Error;
    use crate::append::slack::SlackMessage;

    const DEFAULT_BASE_URL: &str = "https://slack.com";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// A transport posting messages with the `chat.postMessage` method of the Slack Web API.
    ///
    /// The blocking client must not be created or dropped inside an async runtime.
    pub struct WebApiTransport {
        client: reqwest::blocking::Client,
        endpoint: String,
        token: String,
    }

    impl fmt::Debug for WebApiTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("WebApiTransport")
                .field("endpoint", &self.endpoint)
                .finish_non_exhaustive()
        }
    }

    impl WebApiTransport {
        /// Create a transport against `https://slack.com` with a 10 seconds timeout.
        pub fn new(token: impl Into<String>) -> Result<WebApiTransport, Error> {
            Self::builder(token).build()
        }

        /// Create a builder for customizing the transport.
        pub fn builder(token: impl Into<String>) -> WebApiTransportBuilder {
            WebApiTransportBuilder {
                token: token.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: DEFAULT_TIMEOUT,
            }
        }
    }

    /// A builder for [`WebApiTransport`].
    #[derive(Debug)]
    pub struct WebApiTransportBuilder {
        token: String,
        base_url: String,
        timeout: Duration,
    }

    impl WebApiTransportBuilder {
        /// Set the API base URL, e.g. a proxy or a mock server.
        pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into();
            self
        }

        /// Set the timeout of a whole request.
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        /// Build the transport.
        pub fn build(self) -> Result<WebApiTransport, Error> {
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|err| Error::config("failed to build slack http client").with_source(err))?;

            let base_url = self.base_url.trim_end_matches('/');
            Ok(WebApiTransport {
                client,
                endpoint: format!("{base_url}/api/chat.postMessage"),
                token: self.token,
            })
        }
    }

    impl Transport for WebApiTransport {
        fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error> {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.token)
                .json(message)
                .send()
                .map_err(|err| {
                    Error::delivery("http request to slack failed")
                        .with_context("timeout", err.is_timeout())
                        .with_source(err)
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(Error::delivery("slack responded with an error status")
                    .with_context("status", status)
                    .with_context("body", body));
            }

            let body: Value = response.json().map_err(|err| {
                Error::delivery("failed to decode slack response").with_source(err)
            })?;

            if body.get("ok").and_then(Value::as_bool) == Some(false) {
                let reason = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown_error");
                return Err(Error::delivery("slack rejected the message").with_context("error", reason));
            }

            Ok(Acknowledgment::new(body))
        }
    }
}
