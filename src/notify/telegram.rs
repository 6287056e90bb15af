use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::{Notifier, NotifyOutcome};
use crate::config::Telegram;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Bot API `sendMessage` to a single chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    credentials: Telegram,
}

impl TelegramNotifier {
    pub fn new(client: Client, base_url: impl ToString, credentials: Telegram) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            credentials,
        }
    }

    fn has_credentials(&self) -> bool {
        !self.credentials.bot_token.trim().is_empty() && !self.credentials.chat_id.trim().is_empty()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    // the bot token is part of the URL, keep it out of spans
    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> NotifyOutcome {
        if !self.has_credentials() {
            warn!("telegram credentials missing, not sending");
            return NotifyOutcome::Skipped("missing telegram credentials".to_string());
        }

        let url = format!(
            "{}/bot{}/sendMessage",
            self.base_url,
            self.credentials.bot_token.trim()
        );
        let payload = SendMessage {
            chat_id: self.credentials.chat_id.trim(),
            text,
            disable_web_page_preview: true,
        };

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to send Telegram message: {}", e.without_url());
                return NotifyOutcome::Failed("request failed".to_string());
            }
        };

        let status = response.status();
        let body = response.json::<ApiResponse>().await;

        match body {
            Ok(ApiResponse { ok: true, .. }) if status.is_success() => {
                info!("Successfully sent Telegram message");
                NotifyOutcome::Sent
            }
            Ok(ApiResponse { description, .. }) => {
                let reason = description.unwrap_or_else(|| format!("HTTP {status}"));
                error!("Telegram message failed: {reason}");
                NotifyOutcome::Failed(reason)
            }
            Err(_) => {
                error!("Telegram message failed with status: {status}");
                NotifyOutcome::Failed(format!("HTTP {status}"))
            }
        }
    }
}
