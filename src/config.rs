use anyhow::{Context, Result};
use std::env;

use crate::state_machine::state::ChatId;

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    /// Destination chat for completed applications. `None` when the
    /// configured value is not a numeric chat id; applications are then
    /// dropped with a log line instead of being forwarded.
    pub admin_chat: Option<ChatId>,
    /// Externally reachable base address the webhook is registered under.
    pub webhook_url: String,
    pub port: u16,
    /// Optional shared secret; when set, inbound webhooks must carry it in
    /// the `X-Telegram-Bot-Api-Secret-Token` header.
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token =
            env::var("BOT_TOKEN").context("BOT_TOKEN environment variable is required")?;

        let admin_chat_raw =
            env::var("ADMIN_CHAT_ID").context("ADMIN_CHAT_ID environment variable is required")?;
        let admin_chat = parse_admin_chat(&admin_chat_raw);

        let webhook_url =
            env::var("WEBHOOK_URL").context("WEBHOOK_URL environment variable is required")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Config {
            bot_token,
            admin_chat,
            webhook_url,
            port,
            webhook_secret,
        })
    }

    /// The exact endpoint registered with Telegram: the configured base
    /// address with the webhook mounted at its root.
    pub fn webhook_endpoint(&self) -> String {
        format!("{}/", self.webhook_url.trim_end_matches('/'))
    }
}

/// A present-but-unusable admin id degrades to "no destination" rather than
/// failing startup; the applicant-facing flow works either way.
pub fn parse_admin_chat(value: &str) -> Option<ChatId> {
    match value.trim().parse::<i64>() {
        Ok(id) => Some(ChatId(id)),
        Err(_) => {
            tracing::warn!(
                "ADMIN_CHAT_ID is not a numeric chat id; completed applications will not be forwarded"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_chat_numeric() {
        assert_eq!(parse_admin_chat("-1001234"), Some(ChatId(-1001234)));
        assert_eq!(parse_admin_chat("  42 "), Some(ChatId(42)));
    }

    #[test]
    fn test_parse_admin_chat_invalid_degrades_to_none() {
        assert_eq!(parse_admin_chat("@admins"), None);
        assert_eq!(parse_admin_chat(""), None);
    }
}
