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
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use logroute::AppenderHandle;
use logroute::Error;
use logroute::Layout;
use logroute::Registry;
use logroute::append::Slack;
use logroute::layout::CustomLayout;
use logroute::layout::DefaultLayoutProvider;
use logroute::layout::LayoutProvider;
use logroute::layout::LayoutSpec;
use regex::Regex;

mod common;
use common::CaptureTrap;
use common::DelayedTransport;
use common::FailingTransport;
use common::RecordingTransport;
use common::slack_config;

fn slack_handle(
    name: &str,
    provider: &dyn LayoutProvider,
    transport: impl logroute::append::slack::Transport,
    trap: &CaptureTrap,
) -> AppenderHandle {
    let slack = Slack::with_transport(slack_config(), provider, transport)
        .unwrap()
        .with_trap(trap.clone());
    AppenderHandle::builder(name)
        .trap(trap.clone())
        .build(slack)
        .unwrap()
}

#[test]
fn one_event_one_message() {
    let registry = Registry::new();
    let transport = RecordingTransport::default();
    let trap = CaptureTrap::default();
    registry.register(
        "slack",
        vec![slack_handle("slack", &DefaultLayoutProvider::default(), transport.clone(), &trap)],
    );

    registry.logger("slack").info("Log event #1");
    registry.flush().unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, "#CHANNEL");
    assert_eq!(sent[0].username, "USERNAME");
    assert_eq!(sent[0].text, "Log event #1");
    assert_eq!(sent[0].icon_url, None);
    assert!(trap.errors().is_empty());
    assert_eq!(trap.notices().len(), 1);
    assert!(trap.notices()[0].starts_with("slack acknowledged message to #CHANNEL"));
}

#[test]
fn events_are_never_batched() {
    let registry = Registry::new();
    let transport = RecordingTransport::default();
    let trap = CaptureTrap::default();
    registry.register(
        "slack",
        vec![slack_handle("slack", &DefaultLayoutProvider::default(), transport.clone(), &trap)],
    );

    let logger = registry.logger("slack");
    for n in 1..=3 {
        logger.info(format!("Log event #{n}"));
        std::thread::sleep(Duration::from_millis(500));
    }
    registry.flush().unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    for (i, message) in sent.iter().enumerate() {
        let pattern = Regex::new(&format!(r".*Log event #{}", i + 1)).unwrap();
        assert!(pattern.is_match(&message.text), "{message:?}");
        assert_eq!(message.channel, "#CHANNEL");
        assert_eq!(message.username, "USERNAME");
    }
}

#[test]
fn empty_messages_are_still_sent() {
    let registry = Registry::new();
    let transport = RecordingTransport::default();
    let trap = CaptureTrap::default();
    registry.set_default_appenders(vec![slack_handle(
        "slack",
        &DefaultLayoutProvider::default(),
        transport.clone(),
        &trap,
    )]);

    registry.logger("anything").warn("");
    registry.flush().unwrap();

    assert_eq!(transport.texts(), [""]);
}

#[derive(Debug, Default)]
struct CountingProvider {
    calls: Mutex<Vec<LayoutSpec>>,
}

impl LayoutProvider for CountingProvider {
    fn resolve(&self, spec: &LayoutSpec) -> Result<Arc<dyn Layout>, Error> {
        self.calls.lock().unwrap().push(spec.clone());
        let prefix = spec
            .params()
            .get("prefix")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_owned();
        Ok(Arc::new(CustomLayout::new(move |event| {
            Ok(format!("{prefix} {} {}", event.level(), event.message()))
        })))
    }
}

#[test]
fn configured_layout_is_resolved_once_and_reused() {
    let provider = CountingProvider::default();
    let mut config = slack_config();
    config.layout = Some(LayoutSpec::new("custom").param("prefix", "[app]"));

    let transport = RecordingTransport::default();
    let slack = Slack::with_transport(config, &provider, transport.clone()).unwrap();
    let registry = Registry::new();
    registry.register("app", vec![AppenderHandle::new("slack", slack).unwrap()]);

    let logger = registry.logger("app.jobs");
    logger.info("Log event #1");
    logger.error("Log event #2");
    registry.flush().unwrap();

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind(), "custom");
    assert_eq!(calls[0].params().get("prefix"), Some(&"[app]".into()));
    assert_eq!(
        transport.texts(),
        ["[app] INFO Log event #1", "[app] ERROR Log event #2"]
    );
}

#[test]
fn slack_layout_overrides_the_category_layout() {
    let registry = Registry::new();
    let transport = RecordingTransport::default();
    let trap = CaptureTrap::default();
    registry.register(
        "app",
        vec![slack_handle("slack", &DefaultLayoutProvider::default(), transport.clone(), &trap)],
    );
    registry.set_layout(
        "app",
        CustomLayout::new(|_| Err(Error::render("category layout must not be used"))),
    );

    registry.logger("app").info("raw message");
    registry.flush().unwrap();

    assert_eq!(transport.texts(), ["raw message"]);
    assert!(trap.errors().is_empty());
}

#[test]
fn emitting_does_not_wait_for_delivery() {
    let registry = Registry::new();
    let transport = DelayedTransport {
        delay: Duration::from_millis(200),
        inner: RecordingTransport::default(),
    };
    let trap = CaptureTrap::default();
    registry.register(
        "slow",
        vec![slack_handle("slow", &DefaultLayoutProvider::default(), transport.clone(), &trap)],
    );

    let logger = registry.logger("slow");
    let start = Instant::now();
    for n in 1..=5 {
        logger.info(format!("Log event #{n}"));
    }
    assert!(start.elapsed() < Duration::from_millis(200));
    assert!(transport.inner.sent().len() < 5);

    registry.flush().unwrap();
    assert_eq!(
        transport.inner.texts(),
        (1..=5).map(|n| format!("Log event #{n}")).collect::<Vec<_>>()
    );
}

#[test]
fn a_failed_delivery_does_not_affect_later_events_or_other_appenders() {
    let registry = Registry::new();
    let provider = DefaultLayoutProvider::default();
    let failing = FailingTransport::new(1);
    let healthy = RecordingTransport::default();
    let failing_trap = CaptureTrap::default();
    let healthy_trap = CaptureTrap::default();
    registry.register(
        "app",
        vec![
            slack_handle("failing", &provider, failing.clone(), &failing_trap),
            slack_handle("healthy", &provider, healthy.clone(), &healthy_trap),
        ],
    );

    let logger = registry.logger("app");
    logger.error("Log event #1");
    logger.error("Log event #2");
    registry.flush().unwrap();

    assert_eq!(failing.attempts(), 2);
    assert_eq!(failing.inner.texts(), ["Log event #2"]);
    assert_eq!(healthy.texts(), ["Log event #1", "Log event #2"]);

    let errors = failing_trap.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("failed to send log event to slack (DeliveryError)"));
    assert!(errors[0].contains(r#""text":"Log event #1""#));
    assert!(errors[0].contains("appender: failing"));
    assert!(healthy_trap.errors().is_empty());
}

#[test]
fn legacy_format_option_is_ignored() {
    let config: logroute::append::slack::SlackConfig = serde_json::from_str(
        r##"{
            "token": "TOKEN",
            "channel_id": "#CHANNEL",
            "username": "USERNAME",
            "format": "FORMAT",
            "icon_url": "ICON_URL"
        }"##,
    )
    .unwrap();

    let transport = RecordingTransport::default();
    let slack =
        Slack::with_transport(config, &DefaultLayoutProvider::default(), transport.clone())
            .unwrap();
    let registry = Registry::new();
    registry.set_default_appenders(vec![AppenderHandle::new("slack", slack).unwrap()]);

    registry.logger("slack").info("Log event #1");
    registry.flush().unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, "#CHANNEL");
    assert_eq!(sent[0].username, "USERNAME");
    assert_eq!(sent[0].icon_url.as_deref(), Some("ICON_URL"));
    assert!(Regex::new(r".*Log event #1").unwrap().is_match(&sent[0].text));
}
