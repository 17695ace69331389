//! Slack incoming-webhook notifications.
//!
//! Notifications are best effort: an unset webhook sends nothing and a failed
//! post is only logged.

use aixp_core::{AppError, AppResult};
use serde_json::json;
use std::time::Duration;

const SLACK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct SlackNotifier {
    webhook: Option<String>,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SLACK_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            webhook: webhook.filter(|w| !w.trim().is_empty()),
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook.is_some()
    }

    /// Post a message. Never fails.
    pub async fn notify(&self, message: &str) {
        let Some(webhook) = &self.webhook else {
            return;
        };

        match self.send(webhook, message).await {
            Ok(()) => tracing::debug!("Slack notification sent"),
            Err(e) => tracing::warn!("Slack notification failed: {}", e),
        }
    }

    async fn send(&self, webhook: &str, message: &str) -> AppResult<()> {
        let response = self
            .client
            .post(webhook)
            .json(&payload(message))
            .send()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch(format!(
                "Slack returned HTTP {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

fn payload(message: &str) -> serde_json::Value {
    json!({ "text": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_format() {
        assert_eq!(payload("Ingested 3 chunks"), json!({"text": "Ingested 3 chunks"}));
    }

    #[test]
    fn test_blank_webhook_disables() {
        assert!(!SlackNotifier::new(None).unwrap().is_enabled());
        assert!(!SlackNotifier::new(Some("  ".to_string())).unwrap().is_enabled());
        assert!(SlackNotifier::new(Some("https://hooks.slack.com/x".to_string()))
            .unwrap()
            .is_enabled());
    }

    #[tokio::test]
    async fn test_notify_without_webhook_is_noop() {
        SlackNotifier::new(None).unwrap().notify("ignored").await;
    }
}
