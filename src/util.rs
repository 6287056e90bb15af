const FRED_API_KEY: &str = "FRED_API_KEY";

/// Placeholder shipped in sample configurations; treated as "no key".
pub const FRED_KEY_PLACEHOLDER: &str = "YOUR_FRED_API_KEY";

pub fn get_fred_api_key() -> Option<String> {
    non_empty_var(FRED_API_KEY).filter(|key| key != FRED_KEY_PLACEHOLDER)
}

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";

const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub fn get_telegram_credentials() -> Option<(String, String)> {
    let token = non_empty_var(TELEGRAM_BOT_TOKEN)?;
    let chat_id = non_empty_var(TELEGRAM_CHAT_ID)?;
    Some((token, chat_id))
}

const DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

pub fn get_discord_webhook() -> Option<String> {
    non_empty_var(DISCORD_WEBHOOK_URL)
}

const SNAPSHOT_PATH: &str = "MACRO_PULSE_SNAPSHOT";

pub fn get_snapshot_path() -> Option<String> {
    non_empty_var(SNAPSHOT_PATH)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Cut `text` down to at most `max` characters, respecting char boundaries.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
