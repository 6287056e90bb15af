//! Outbound notification channels
//!
//! The tick hands a finished text to a `Notifier` and only cares whether it
//! went out. Sending is attempted once; failures are logged and reported as
//! an outcome, never retried and never propagated.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, NotifierConfig};

pub mod discord;
pub mod telegram;
pub mod webhook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Nothing was sent on purpose (no credentials, nothing to report, ...)
    Skipped(String),
    Failed(String),
}

impl fmt::Display for NotifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyOutcome::Sent => f.write_str("sent"),
            NotifyOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            NotifyOutcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn channel(&self) -> &'static str;

    async fn send(&self, text: &str) -> NotifyOutcome;
}

/// Used when no channel is configured at all.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn channel(&self) -> &'static str {
        "none"
    }

    async fn send(&self, _text: &str) -> NotifyOutcome {
        NotifyOutcome::Skipped("no notifier configured".to_string())
    }
}

pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build notifier HTTP client")
}

/// Build the configured channel.
pub fn from_config(config: &Config) -> anyhow::Result<Box<dyn Notifier>> {
    let Some(notifier) = &config.notifier else {
        return Ok(Box::new(DisabledNotifier));
    };

    let client = http_client(config.notify_timeout())?;

    Ok(match notifier {
        NotifierConfig::Telegram(telegram) => Box::new(telegram::TelegramNotifier::new(
            client,
            &config.endpoints.telegram,
            telegram.clone(),
        )),
        NotifierConfig::Discord(discord) => {
            Box::new(discord::DiscordNotifier::new(client, discord.clone()))
        }
        NotifierConfig::Webhook(webhook) => {
            Box::new(webhook::WebhookNotifier::new(client, webhook.clone()))
        }
    })
}
