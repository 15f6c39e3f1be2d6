//! Notification dispatch contract.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::templates::render_message;

/// Notification errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// A request to notify a patient about a new consultation note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRequest {
    pub patient_id: String,
    /// Id of the consultation the message refers to
    pub note_id: String,
    pub template_id: String,
}

/// Delivery result for a single channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelOutcome {
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate delivery report, keyed by channel name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationReport {
    pub success: bool,
    pub channels: BTreeMap<String, ChannelOutcome>,
}

impl NotificationReport {
    /// Build a report from per-channel outcomes. Overall success means at
    /// least one channel delivered.
    pub fn from_channels(channels: BTreeMap<String, ChannelOutcome>) -> Self {
        let success = channels.values().any(|c| c.success);
        Self { success, channels }
    }

    /// Names of channels that failed to deliver.
    pub fn failed_channels(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|(_, outcome)| !outcome.success)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Delivers templated messages to patients.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify_patient(&self, request: &NotificationRequest)
        -> NotifyResult<NotificationReport>;
}

/// A rendered message captured by [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub request: NotificationRequest,
    pub body: String,
}

/// In-process dispatcher that records requests instead of delivering them.
///
/// Channels can be configured to fail, or the whole dispatch can be made to
/// return an error, to exercise best-effort handling in callers.
pub struct RecordingDispatcher {
    channels: Vec<String>,
    failing_channels: Vec<String>,
    fail_all: bool,
    sent: Mutex<Vec<SentMessage>>,
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDispatcher {
    /// Dispatcher with `sms` and `email` channels that always succeed.
    pub fn new() -> Self {
        Self {
            channels: vec!["email".into(), "sms".into()],
            failing_channels: Vec::new(),
            fail_all: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make the named channel report a failed delivery.
    pub fn with_failing_channel(mut self, channel: &str) -> Self {
        self.failing_channels.push(channel.to_string());
        self
    }

    /// Make every dispatch return [`NotifyError::Delivery`].
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    /// Messages recorded so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify_patient(
        &self,
        request: &NotificationRequest,
    ) -> NotifyResult<NotificationReport> {
        if self.fail_all {
            return Err(NotifyError::Delivery("notification service unavailable".into()));
        }

        let body = render_message(&request.template_id, &request.patient_id, &request.note_id);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                request: request.clone(),
                body,
            });
        }

        let channels = self
            .channels
            .iter()
            .map(|name| {
                let outcome = if self.failing_channels.contains(name) {
                    ChannelOutcome::failed(format!("{} delivery rejected", name))
                } else {
                    ChannelOutcome::delivered()
                };
                (name.clone(), outcome)
            })
            .collect();

        tracing::debug!(patient_id = %request.patient_id, template = %request.template_id, "recorded notification");
        Ok(NotificationReport::from_channels(channels))
    }
}
