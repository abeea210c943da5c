// # Notification Channels
//
// Telegram and Discord implementations of the `Notifier` seam, plus a
// builder that assembles the configured set.
//
// ## Contract
//
// Each channel performs exactly one outbound call per message and reports
// its outcome. The engine treats every failure as log-only: a broken
// channel never fails a reconciliation cycle and never blocks the other
// channel.

use std::time::Duration;

use async_trait::async_trait;
use cfddns_core::config::NotificationConfig;
use cfddns_core::traits::Notifier;
use cfddns_core::{Error, Result};

/// Telegram bot API base URL
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Transport deadline for each notification call
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::other(format!("failed to build HTTP client: {e}")))
}

/// Telegram chat-bot channel
///
/// Sends via `GET /bot{token}/sendMessage?chat_id=...&text=...`.
pub struct TelegramNotifier {
    chat_id: String,
    bot_token: String,
    base_url: String,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .field("bot_token", &"<REDACTED>")
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(chat_id: impl Into<String>, bot_token: impl Into<String>) -> Result<Self> {
        let chat_id = chat_id.into();
        let bot_token = bot_token.into();

        if chat_id.is_empty() || bot_token.is_empty() {
            return Err(Error::config(
                "Telegram chat id and bot token cannot be empty",
            ));
        }

        Ok(Self {
            chat_id,
            bot_token,
            base_url: TELEGRAM_API_BASE.to_string(),
            client: build_client()?,
        })
    }

    /// Override the API base URL (for tests against a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .get(self.send_message_url())
            .query(&[("chat_id", self.chat_id.as_str()), ("text", message)])
            .send()
            .await
            .map_err(|e| Error::notification(format!("Telegram request failed: {e}")))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::notification(format!(
                "Telegram send failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "telegram"
    }
}

/// Discord webhook channel
///
/// Sends via `POST {webhook_url}` with body `{"content": message}`.
/// Discord answers 204 on the plain webhook call; 200 is also accepted.
#[derive(Debug)]
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(Error::config("Discord webhook URL cannot be empty"));
        }

        Ok(Self {
            webhook_url,
            client: build_client()?,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "content": message }))
            .send()
            .await
            .map_err(|e| Error::notification(format!("Discord request failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::NO_CONTENT {
            return Err(Error::notification(format!(
                "Discord send failed with status {status}"
            )));
        }

        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "discord"
    }
}

/// Build the configured notifier set
///
/// An empty configuration yields an empty set; the engine then skips
/// dispatch entirely.
pub fn from_config(config: &NotificationConfig) -> Result<Vec<Box<dyn Notifier>>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if let Some(telegram) = &config.telegram {
        notifiers.push(Box::new(TelegramNotifier::new(
            &telegram.chat_id,
            &telegram.bot_token,
        )?));
    }

    if let Some(discord) = &config.discord {
        notifiers.push(Box::new(DiscordNotifier::new(&discord.webhook_url)?));
    }

    Ok(notifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfddns_core::config::{DiscordConfig, TelegramConfig};

    #[test]
    fn telegram_url_embeds_token_but_debug_does_not() {
        let notifier = TelegramNotifier::new("42", "123:secret").unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot123:secret/sendMessage"
        );

        let debug_str = format!("{notifier:?}");
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("42"));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(TelegramNotifier::new("", "token").is_err());
        assert!(TelegramNotifier::new("42", "").is_err());
        assert!(DiscordNotifier::new("").is_err());
    }

    #[test]
    fn from_config_builds_configured_channels() {
        let empty = NotificationConfig::default();
        assert!(from_config(&empty).unwrap().is_empty());

        let both = NotificationConfig {
            telegram: Some(TelegramConfig {
                chat_id: "42".to_string(),
                bot_token: "123:abc".to_string(),
            }),
            discord: Some(DiscordConfig {
                webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
            }),
        };

        let notifiers = from_config(&both).unwrap();
        assert_eq!(notifiers.len(), 2);
        assert_eq!(notifiers[0].channel_name(), "telegram");
        assert_eq!(notifiers[1].channel_name(), "discord");
    }
}
