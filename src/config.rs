use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, trace};

use crate::MetricId;
use crate::util;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Where the last snapshot is kept between ticks
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// FRED API key; FRED-backed sources fail over immediately without it
    pub fred_api_key: Option<String>,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Timeout for a single provider request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on resolving one metric, retries and backoff included.
    /// 0 disables it.
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,

    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// Per-metric overrides of the default threshold table
    #[serde(default)]
    pub thresholds: HashMap<MetricId, f64>,

    pub notifier: Option<NotifierConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            fred_api_key: None,
            retry: RetryConfig::default(),
            request_timeout_secs: default_request_timeout(),
            deadline_secs: default_deadline(),
            notify_timeout_secs: default_notify_timeout(),
            endpoints: Endpoints::default(),
            thresholds: HashMap::new(),
            notifier: None,
        }
    }
}

impl Config {
    /// Load the config file if one is given, then fill gaps from the environment.
    pub fn load(path: Option<&str>) -> anyhow::Result<Config> {
        let mut config = match path {
            Some(path) => read_config_file(path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment values only fill in what the file left unset, except the
    /// snapshot path which the environment always overrides.
    pub fn apply_env(&mut self) {
        if self.fred_api_key().is_none() {
            self.fred_api_key = util::get_fred_api_key();
        }

        if self.notifier.is_none() {
            if let Some((bot_token, chat_id)) = util::get_telegram_credentials() {
                debug!("using telegram notifier from environment");
                self.notifier = Some(NotifierConfig::Telegram(Telegram { bot_token, chat_id }));
            } else if let Some(url) = util::get_discord_webhook() {
                debug!("using discord notifier from environment");
                self.notifier = Some(NotifierConfig::Discord(Discord { url, user_id: None }));
            }
        }

        if let Some(path) = util::get_snapshot_path() {
            self.snapshot_path = PathBuf::from(path);
        }
    }

    /// The configured FRED key, ignoring blanks and the sample placeholder.
    pub fn fred_api_key(&self) -> Option<&str> {
        self.fred_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != util::FRED_KEY_PLACEHOLDER)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff(),
        }
    }
}

/// Provider base URLs.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub fred: String,
    pub yahoo: String,
    pub coingecko: String,
    pub llama_protocols: String,
    pub llama_stablecoins: String,
    pub telegram: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            fred: "https://api.stlouisfed.org".to_string(),
            yahoo: "https://query1.finance.yahoo.com".to_string(),
            coingecko: "https://api.coingecko.com".to_string(),
            llama_protocols: "https://api.llama.fi".to_string(),
            llama_stablecoins: "https://stablecoins.llama.fi".to_string(),
            telegram: "https://api.telegram.org".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at the same base URL.
    pub fn all(base: &str) -> Self {
        Self {
            fred: base.to_string(),
            yahoo: base.to_string(),
            coingecko: base.to_string(),
            llama_protocols: base.to_string(),
            llama_stablecoins: base.to_string(),
            telegram: base.to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierConfig {
    Telegram(Telegram),
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Telegram {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("dashboard_data.json")
}

fn default_max_attempts() -> u32 {
    2
}

fn default_backoff() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    10
}

fn default_deadline() -> u64 {
    60
}

fn default_notify_timeout() -> u64 {
    10
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
