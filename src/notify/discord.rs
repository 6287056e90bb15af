use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::{Notifier, NotifyOutcome};
use crate::config::Discord;

/// Embed descriptions are capped at 4096 characters by Discord.
const MAX_DESCRIPTION: usize = 4096;

const PULSE_COLOR: u32 = 0x3498DB;

const FOOTER: &str = "macro-pulse";

/// Webhook execute payload.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Builds the single-embed message for one pulse update.
pub struct MessageBuilder {
    mention: Option<String>,
    embed: Embed,
}

impl MessageBuilder {
    pub fn new(title: impl ToString) -> Self {
        Self {
            mention: None,
            embed: Embed {
                title: title.to_string(),
                description: None,
                color: PULSE_COLOR,
                footer: EmbedFooter {
                    text: FOOTER.to_string(),
                },
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        let description: String = description.trim().chars().take(MAX_DESCRIPTION).collect();
        self.embed.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn mention(mut self, user_id: Option<&str>) -> Self {
        self.mention = user_id.map(|user_id| format!("📊 <@{user_id}>"));
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.mention,
            embeds: vec![self.embed],
        }
    }
}

/// Posts the update as a single embed to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    discord: Discord,
}

impl DiscordNotifier {
    pub fn new(client: Client, discord: Discord) -> Self {
        Self { client, discord }
    }

    /// First line of the text becomes the title, the rest the description.
    pub fn build_message(&self, text: &str) -> Message {
        let (title, description) = text.split_once('\n').unwrap_or((text, ""));

        MessageBuilder::new(title)
            .description(description)
            .mention(self.discord.user_id.as_deref())
            .build()
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn channel(&self) -> &'static str {
        "discord"
    }

    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> NotifyOutcome {
        if self.discord.url.trim().is_empty() {
            warn!("discord webhook url missing, not sending");
            return NotifyOutcome::Skipped("missing discord webhook url".to_string());
        }

        let message = self.build_message(text);

        let response = match self.client.post(&self.discord.url).json(&message).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("discord webhook unreachable: {}", e.without_url());
                return NotifyOutcome::Failed("request failed".to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            info!("discord update posted");
            return NotifyOutcome::Sent;
        }

        let detail = response.text().await.unwrap_or_default();
        error!("discord webhook rejected update ({status}): {detail}");
        NotifyOutcome::Failed(format!("HTTP {status}"))
    }
}
