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

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use logroute::Error;
use logroute::Trap;
use logroute::append::slack::Acknowledgment;
use logroute::append::slack::SlackConfig;
use logroute::append::slack::SlackMessage;
use logroute::append::slack::Transport;
use serde_json::json;

pub fn slack_config() -> SlackConfig {
    SlackConfig {
        token: "TOKEN".to_string(),
        channel_id: "#CHANNEL".to_string(),
        username: "USERNAME".to_string(),
        icon_url: None,
        layout: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub channel: String,
    pub username: String,
    pub text: String,
    pub icon_url: Option<String>,
}

impl From<&SlackMessage<'_>> for Sent {
    fn from(message: &SlackMessage<'_>) -> Self {
        Sent {
            channel: message.channel.to_owned(),
            username: message.username.to_owned(),
            text: message.text.to_owned(),
            icon_url: message.icon_url.map(str::to_owned),
        }
    }
}

/// Records every message and acknowledges it.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.into());
        Ok(Acknowledgment::new(json!({ "ok": true, "ts": sent.len().to_string() })))
    }
}

/// Sleeps before every send.
#[derive(Debug, Clone)]
pub struct DelayedTransport {
    pub delay: Duration,
    pub inner: RecordingTransport,
}

impl Transport for DelayedTransport {
    fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error> {
        std::thread::sleep(self.delay);
        self.inner.send(message)
    }
}

/// Fails the first `failures` sends, then records.
#[derive(Debug, Clone)]
pub struct FailingTransport {
    failures: usize,
    attempts: Arc<AtomicUsize>,
    pub inner: RecordingTransport,
}

impl FailingTransport {
    pub fn new(failures: usize) -> Self {
        FailingTransport {
            failures,
            attempts: Arc::new(AtomicUsize::new(0)),
            inner: RecordingTransport::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for FailingTransport {
    fn send(&self, message: &SlackMessage<'_>) -> Result<Acknowledgment, Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(Error::delivery("channel_not_found"));
        }
        self.inner.send(message)
    }
}

/// Captures trapped errors and notices.
#[derive(Debug, Default, Clone)]
pub struct CaptureTrap {
    errors: Arc<Mutex<Vec<String>>>,
    notices: Arc<Mutex<Vec<String>>>,
}

impl CaptureTrap {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Trap for CaptureTrap {
    fn trap(&self, err: &Error) {
        self.errors.lock().unwrap().push(err.to_string());
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_owned());
    }
}
