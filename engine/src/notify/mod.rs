//! Chat webhook notifications
//!
//! Payload builders are pure so they can be checked without a network;
//! [`WebhookNotifier`] only posts what they produce.

use crate::report::Report;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Clusters listed in the Slack "Top Failures" section
const TOP_FAILURES: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Caller asked for a platform that has no payload builder
    #[error("Unsupported notification type: {0}")]
    UnsupportedKind(String),

    /// HTTP client could not be built or the request failed in transit
    #[error("Webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Supported chat platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Slack,
    Teams,
}

impl FromStr for NotificationKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slack" => Ok(Self::Slack),
            "teams" => Ok(Self::Teams),
            other => Err(NotifyError::UnsupportedKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slack => write!(f, "slack"),
            Self::Teams => write!(f, "teams"),
        }
    }
}

/// Where to deliver a report summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub kind: NotificationKind,
    pub webhook_url: String,
}

impl NotificationTarget {
    pub fn new(kind: NotificationKind, webhook_url: impl Into<String>) -> Self {
        Self {
            kind,
            webhook_url: webhook_url.into(),
        }
    }

    /// Payload for this target's platform
    pub fn payload(&self, report: &Report) -> Value {
        match self.kind {
            NotificationKind::Slack => slack_payload(report),
            NotificationKind::Teams => teams_payload(report),
        }
    }
}

/// Slack Block Kit message
pub fn slack_payload(report: &Report) -> Value {
    let summary = &report.summary;
    let status_emoji = if summary.failed > 0 { "❌" } else { "✅" };

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} Test Report: {}", status_emoji, summary.framework.to_uppercase()),
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "fields": [
                {"type": "mrkdwn", "text": format!("*Total:* {}", summary.total)},
                {"type": "mrkdwn", "text": format!("*Passed:* {} ✅", summary.passed)},
                {"type": "mrkdwn", "text": format!("*Failed:* {} ❌", summary.failed)},
                {"type": "mrkdwn", "text": format!("*Duration:* {:.2}s", summary.duration as f64 / 1000.0)}
            ]
        }),
    ];

    if let Some(insights) = report.insights.as_ref().filter(|i| !i.is_empty()) {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Actionable Insights:*\n• {}", insights.join("\n• "))
            }
        }));
    }

    if let Some(clusters) = report.clusters.as_ref().filter(|c| !c.is_empty()) {
        let top = clusters
            .iter()
            .take(TOP_FAILURES)
            .map(|c| format!("*{}x* `{}`", c.count, c.message))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": format!("*Top Failures:*\n{}", top)}
        }));
    }

    json!({ "blocks": blocks })
}

/// Microsoft Teams Adaptive Card message
pub fn teams_payload(report: &Report) -> Value {
    let summary = &report.summary;
    json!({
        "type": "message",
        "attachments": [{
            "contentType": "application/vnd.microsoft.card.adaptive",
            "content": {
                "type": "AdaptiveCard",
                "body": [
                    {
                        "type": "TextBlock",
                        "size": "Medium",
                        "weight": "Bolder",
                        "text": format!("Test Report: {}", summary.framework)
                    },
                    {
                        "type": "FactSet",
                        "facts": [
                            {"title": "Total", "value": summary.total.to_string()},
                            {"title": "Passed", "value": summary.passed.to_string()},
                            {"title": "Failed", "value": summary.failed.to_string()}
                        ]
                    }
                ],
                "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
                "version": "1.2"
            }
        }]
    })
}

/// Posts report payloads to chat webhooks
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Deliver one report summary.
    pub async fn send(&self, report: &Report, target: &NotificationTarget) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&target.webhook_url)
            .json(&target.payload(report))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!(kind = %target.kind, "notification sent");
        Ok(())
    }
}
