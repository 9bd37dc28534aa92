use crate::{ReleaseNotifier, ReleaseSummary};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracker_core::{Result, TrackerError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts a Block Kit message to a Slack incoming webhook.
pub struct SlackNotifier {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(webhook_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self { http_client, webhook_url: webhook_url.into() })
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn build_payload(summary: &ReleaseSummary) -> Value {
        let mut blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("🚀 New Release: {}", summary.product.name),
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Release:*\n{}", summary.release.name) },
                    { "type": "mrkdwn", "text": format!("*Release Date:*\n{}", summary.display_date()) }
                ]
            }),
            json!({ "type": "divider" }),
        ];

        for (item_type, items) in summary.groups() {
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*{}*", item_type) }
            }));

            let lines: Vec<String> = items
                .iter()
                .map(|item| {
                    format!(
                        "• *{}*: {}",
                        item.title,
                        item.description.as_deref().unwrap_or("No description")
                    )
                })
                .collect();
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": lines.join("\n") }
            }));
        }

        json!({ "blocks": blocks })
    }
}

#[async_trait]
impl ReleaseNotifier for SlackNotifier {
    async fn notify(&self, summary: &ReleaseSummary) -> Result<()> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&Self::build_payload(summary))
            .send()
            .await
            .map_err(|e| TrackerError::Notification(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TrackerError::Notification(format!(
                "webhook request failed: HTTP {}",
                response.status()
            )));
        }

        tracing::info!(release.id = %summary.release.id, "slack notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::fixtures::summary;
    use tracker_core::ItemType;

    #[test]
    fn test_payload_layout() {
        let mut summary = summary(&[("Dark mode", ItemType::Feature), ("Fix login", ItemType::BugFix)]);
        summary.items[0].description = Some("Theme toggle".into());
        let payload = SlackNotifier::build_payload(&summary);
        let blocks = payload["blocks"].as_array().unwrap();

        assert_eq!(blocks[0]["text"]["text"], "🚀 New Release: Checkout");
        assert_eq!(blocks[1]["fields"][1]["text"], "*Release Date:*\nTue Dec 31 2024");
        assert_eq!(blocks[2]["type"], "divider");
        assert_eq!(blocks[3]["text"]["text"], "*FEATURE*");
        assert_eq!(blocks[4]["text"]["text"], "• *Dark mode*: Theme toggle");
        assert_eq!(blocks[5]["text"]["text"], "*BUG_FIX*");
        assert_eq!(blocks[6]["text"]["text"], "• *Fix login*: No description");
        assert_eq!(blocks.len(), 7);
    }

    #[test]
    fn test_payload_without_items_has_only_heading() {
        let payload = SlackNotifier::build_payload(&summary(&[]));
        assert_eq!(payload["blocks"].as_array().unwrap().len(), 3);
    }
}
