use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use super::{Notifier, NotifyOutcome};
use crate::config::Webhook;

/// Generic JSON webhook: `{"message": ..., "source": ..., "timestamp": ...}`.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook: Webhook,
}

impl WebhookNotifier {
    pub fn new(client: Client, webhook: Webhook) -> Self {
        Self { client, webhook }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn channel(&self) -> &'static str {
        "webhook"
    }

    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> NotifyOutcome {
        if self.webhook.url.trim().is_empty() {
            warn!("webhook url missing, not sending");
            return NotifyOutcome::Skipped("missing webhook url".to_string());
        }

        let payload = json!({
            "message": text,
            "source": "macro-pulse",
            "timestamp": Utc::now().to_rfc3339()
        });

        match self.client.post(&self.webhook.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent webhook notification");
                    NotifyOutcome::Sent
                } else {
                    error!("Webhook notification failed with status: {}", response.status());
                    NotifyOutcome::Failed(format!("HTTP {}", response.status()))
                }
            }
            Err(e) => {
                error!("Failed to send webhook notification: {}", e);
                NotifyOutcome::Failed("request failed".to_string())
            }
        }
    }
}
