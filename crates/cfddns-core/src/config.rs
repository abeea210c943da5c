//! Configuration types for the record synchronization agent
//!
//! One `SyncConfig` describes one managed DNS record. The config is immutable
//! for the lifetime of an engine; a settings change means building a new
//! engine. Validation happens here, at configuration-edit time, never inside
//! a reconciliation cycle.

use serde::{Deserialize, Serialize};

/// TTL sentinel meaning "let the provider pick" (Cloudflare: automatic)
pub const TTL_AUTO: u32 = 1;

/// Minimum explicit record TTL accepted by the provider, in seconds
pub const MIN_TTL: u32 = 120;

/// Maximum explicit record TTL accepted by the provider, in seconds
pub const MAX_TTL: u32 = 7200;

/// Bounds for the reconciliation poll interval, in seconds
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;
pub const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Configuration for one managed DNS record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Target DNS record name (e.g. "host.example.com")
    pub record_name: String,

    /// Provider zone the record lives in
    pub zone_id: String,

    /// Provider API token with edit rights on the zone
    pub api_token: String,

    /// How the current address is acquired
    #[serde(default)]
    pub address_source: AddressSourceKind,

    /// Desired proxied flag on the record
    #[serde(default)]
    pub proxied: bool,

    /// Desired record TTL: 120..=7200, or [`TTL_AUTO`]
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Seconds between scheduled reconciliation cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Whether mismatches are corrected without a manual trigger
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,

    /// Notification channels to inform after a successful update
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but the
    /// provider coordinates
    pub fn new(
        record_name: impl Into<String>,
        zone_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            record_name: record_name.into(),
            zone_id: zone_id.into(),
            api_token: api_token.into(),
            address_source: AddressSourceKind::default(),
            proxied: false,
            ttl: default_ttl(),
            poll_interval_secs: default_poll_interval_secs(),
            auto_update: default_auto_update(),
            notifications: NotificationConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.record_name.is_empty() {
            return Err(crate::Error::config("record name cannot be empty"));
        }
        if self.zone_id.is_empty() {
            return Err(crate::Error::config("zone id cannot be empty"));
        }
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }

        if self.ttl != TTL_AUTO && !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(crate::Error::config(format!(
                "invalid_ttl: TTL must be {TTL_AUTO} (auto) or between {MIN_TTL} and {MAX_TTL}, got {}",
                self.ttl
            )));
        }

        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&self.poll_interval_secs) {
            return Err(crate::Error::config(format!(
                "poll interval must be between {MIN_POLL_INTERVAL_SECS} and {MAX_POLL_INTERVAL_SECS} seconds, got {}",
                self.poll_interval_secs
            )));
        }

        // Proxying only makes sense for publicly routable addresses
        if self.address_source == AddressSourceKind::Internal && self.proxied {
            return Err(crate::Error::config(
                "internal_cannot_proxy: internal addresses cannot be proxied",
            ));
        }

        self.notifications.validate()?;

        Ok(())
    }
}

/// Address acquisition strategy
///
/// Only `External` is implemented; `Internal` is accepted by the
/// configuration surface but its address source fails explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSourceKind {
    /// Public address as seen by an external echo service
    #[default]
    External,
    /// Local-network address (unsupported)
    Internal,
}

/// Notification channel configuration
///
/// Each channel is independently optional; an absent channel is simply not
/// notified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Telegram chat-bot channel
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,

    /// Discord webhook channel
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

impl NotificationConfig {
    /// Validate configured channels
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(telegram) = &self.telegram {
            if telegram.chat_id.is_empty() {
                return Err(crate::Error::config("Telegram chat id cannot be empty"));
            }
            if telegram.bot_token.is_empty() {
                return Err(crate::Error::config("Telegram bot token cannot be empty"));
            }
        }

        if let Some(discord) = &self.discord {
            if discord.webhook_url.is_empty() {
                return Err(crate::Error::config("Discord webhook URL cannot be empty"));
            }
            if !discord.webhook_url.starts_with("https://")
                && !discord.webhook_url.starts_with("http://")
            {
                return Err(crate::Error::config(format!(
                    "Discord webhook URL must use HTTP or HTTPS scheme, got: {}",
                    discord.webhook_url
                )));
            }
        }

        Ok(())
    }

    /// True if at least one channel is configured
    pub fn any_enabled(&self) -> bool {
        self.telegram.is_some() || self.discord.is_some()
    }
}

/// Telegram chat-bot credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub chat_id: String,
    pub bot_token: String,
}

/// Discord webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

fn default_ttl() -> u32 {
    120
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_auto_update() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SyncConfig {
        SyncConfig::new("host.example.com", "zone123", "token123")
    }

    #[test]
    fn defaults_are_applied_on_deserialize() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"record_name":"host.example.com","zone_id":"z","api_token":"t"}"#,
        )
        .unwrap();

        assert_eq!(config.address_source, AddressSourceKind::External);
        assert!(!config.proxied);
        assert_eq!(config.ttl, 120);
        assert_eq!(config.poll_interval_secs, 60);
        assert!(config.auto_update);
        assert!(!config.notifications.any_enabled());
        config.validate().unwrap();
    }

    #[test]
    fn ttl_sentinel_is_accepted_without_range_check() {
        let mut config = base_config();
        config.ttl = TTL_AUTO;
        config.validate().unwrap();
    }

    #[test]
    fn ttl_below_range_is_rejected() {
        let mut config = base_config();
        config.ttl = 50;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid_ttl"), "got: {err}");
    }

    #[test]
    fn ttl_bounds_are_inclusive() {
        let mut config = base_config();
        config.ttl = MIN_TTL;
        config.validate().unwrap();
        config.ttl = MAX_TTL;
        config.validate().unwrap();
        config.ttl = MAX_TTL + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn poll_interval_out_of_range_is_rejected() {
        let mut config = base_config();
        config.poll_interval_secs = 9;
        assert!(config.validate().is_err());
        config.poll_interval_secs = 3601;
        assert!(config.validate().is_err());
        config.poll_interval_secs = 10;
        config.validate().unwrap();
    }

    #[test]
    fn internal_address_cannot_be_proxied() {
        let mut config = base_config();
        config.address_source = AddressSourceKind::Internal;
        config.proxied = true;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("internal_cannot_proxy"), "got: {err}");

        // Unproxied internal passes configuration (the source itself fails later)
        config.proxied = false;
        config.validate().unwrap();
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut config = base_config();
        config.api_token = String::new();
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.zone_id = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn notification_channels_require_credentials() {
        let mut config = base_config();
        config.notifications.telegram = Some(TelegramConfig {
            chat_id: "42".to_string(),
            bot_token: String::new(),
        });
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.notifications.discord = Some(DiscordConfig {
            webhook_url: "ftp://example.com/hook".to_string(),
        });
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.notifications.discord = Some(DiscordConfig {
            webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
        });
        config.validate().unwrap();
    }
}
