// # cfddnsd - DNS Record Synchronization Daemon
//
// Thin integration layer over `cfddns-core`. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and tracing
// 3. Wiring the address source, DNS provider, and notification channels
// 4. Running the sync engine and relaying signals to its control surfaces
//
// All reconciliation logic lives in cfddns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Record
// - `CFDDNS_RECORD_NAME`: Fully qualified DNS record to manage (required)
// - `CFDDNS_ZONE_ID`: Cloudflare zone identifier (required)
// - `CFDDNS_API_TOKEN`: Cloudflare API token (required)
// - `CFDDNS_PROXIED`: Whether the record sits behind the proxy (default: false)
// - `CFDDNS_TTL`: Record TTL in seconds, or 1 for automatic (default: 120)
//
// ### Address Source
// - `CFDDNS_ADDRESS_SOURCE`: Address source type (external, internal)
// - `CFDDNS_ADDRESS_URL`: Echo service URL for the external source
//
// ### Engine
// - `CFDDNS_POLL_INTERVAL`: Seconds between reconciliation cycles (default: 60)
// - `CFDDNS_AUTO_UPDATE`: Whether mismatches are corrected automatically
//   (default: true)
//
// ### Notifications
// - `CFDDNS_TELEGRAM_CHAT_ID` / `CFDDNS_TELEGRAM_BOT_TOKEN`: Telegram channel
// - `CFDDNS_DISCORD_WEBHOOK_URL`: Discord channel
//
// ### Logging
// - `CFDDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Signals
//
// - SIGTERM / SIGINT: graceful shutdown
// - SIGUSR1: run a manual sync cycle now
// - SIGUSR2: toggle automatic updates
//
// ## Example
//
// ```bash
// export CFDDNS_RECORD_NAME=home.example.com
// export CFDDNS_ZONE_ID=your_zone_id
// export CFDDNS_API_TOKEN=your_token
// export CFDDNS_POLL_INTERVAL=300
//
// cfddnsd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use cfddns_core::{
    AddressSource, AddressSourceKind, DiscordConfig, EngineEvent, Notifier, SyncConfig,
    SyncEngine, TelegramConfig,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    record_name: String,
    zone_id: String,
    api_token: String,
    address_source: String,
    address_url: Option<String>,
    proxied: bool,
    ttl: u32,
    poll_interval_secs: u64,
    auto_update: bool,
    telegram_chat_id: Option<String>,
    telegram_bot_token: Option<String>,
    discord_webhook_url: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            record_name: env::var("CFDDNS_RECORD_NAME").map_err(|_| {
                anyhow::anyhow!(
                    "CFDDNS_RECORD_NAME is required. \
                    Set it via: export CFDDNS_RECORD_NAME=home.example.com"
                )
            })?,
            zone_id: env::var("CFDDNS_ZONE_ID").map_err(|_| {
                anyhow::anyhow!(
                    "CFDDNS_ZONE_ID is required. \
                    Set it via: export CFDDNS_ZONE_ID=your_zone_id"
                )
            })?,
            api_token: env::var("CFDDNS_API_TOKEN").map_err(|_| {
                anyhow::anyhow!(
                    "CFDDNS_API_TOKEN is required. \
                    Set it via: export CFDDNS_API_TOKEN=your_token"
                )
            })?,
            address_source: env::var("CFDDNS_ADDRESS_SOURCE")
                .unwrap_or_else(|_| "external".to_string()),
            address_url: env::var("CFDDNS_ADDRESS_URL").ok(),
            proxied: env::var("CFDDNS_PROXIED")
                .ok()
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            ttl: env::var("CFDDNS_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            poll_interval_secs: env::var("CFDDNS_POLL_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            auto_update: env::var("CFDDNS_AUTO_UPDATE")
                .ok()
                .map(|s| s != "false" && s != "0")
                .unwrap_or(true),
            telegram_chat_id: env::var("CFDDNS_TELEGRAM_CHAT_ID").ok(),
            telegram_bot_token: env::var("CFDDNS_TELEGRAM_BOT_TOKEN").ok(),
            discord_webhook_url: env::var("CFDDNS_DISCORD_WEBHOOK_URL").ok(),
            log_level: env::var("CFDDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Daemon-level checks only: presence, formats, and obvious operator
    /// mistakes. Semantic validation (TTL ranges, channel credentials)
    /// happens again inside the engine.
    fn validate(&self) -> Result<()> {
        self.validate_domain_name(&self.record_name)?;

        if self.zone_id.is_empty() {
            anyhow::bail!("CFDDNS_ZONE_ID cannot be empty");
        }

        // Cloudflare API tokens are typically 40 characters alphanumeric
        if self.api_token.len() < 20 {
            anyhow::bail!(
                "CFDDNS_API_TOKEN appears too short ({} chars). \
                Cloudflare tokens are typically 40 characters. \
                Verify your token is correct.",
                self.api_token.len()
            );
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower.contains("example")
            || token_lower == "token"
        {
            anyhow::bail!(
                "CFDDNS_API_TOKEN appears to be a placeholder. \
                Use an actual Cloudflare API token."
            );
        }

        // Validate address source type
        match self.address_source.as_str() {
            "external" | "internal" => {}
            _ => anyhow::bail!(
                "CFDDNS_ADDRESS_SOURCE '{}' is not supported. \
                Supported types: external, internal",
                self.address_source
            ),
        }

        if let Some(ref url) = self.address_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!(
                    "CFDDNS_ADDRESS_URL must use HTTP or HTTPS scheme. Got: {}",
                    url
                );
            }

            if url.starts_with("http://") {
                eprintln!(
                    "WARNING: CFDDNS_ADDRESS_URL uses HTTP (not HTTPS). \
                          This is less secure. Consider using HTTPS."
                );
            }
        }

        // Telegram credentials come as a pair
        if self.telegram_chat_id.is_some() != self.telegram_bot_token.is_some() {
            anyhow::bail!(
                "CFDDNS_TELEGRAM_CHAT_ID and CFDDNS_TELEGRAM_BOT_TOKEN \
                must be set together"
            );
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CFDDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Validate that a string is a valid domain name
    ///
    /// Basic DNS domain name validation per RFC 1035. Not comprehensive,
    /// but catches common errors.
    fn validate_domain_name(&self, domain: &str) -> Result<()> {
        if domain.is_empty() {
            anyhow::bail!("CFDDNS_RECORD_NAME cannot be empty");
        }

        // Total length limit (RFC 1035: 253 chars max)
        if domain.len() > 253 {
            anyhow::bail!(
                "Domain name too long: {} chars (max 253). Got: {}",
                domain.len(),
                domain
            );
        }

        for label in domain.split('.') {
            if label.is_empty() {
                anyhow::bail!("Domain name has empty label: '{}'", domain);
            }

            if label.len() > 63 {
                anyhow::bail!(
                    "Domain label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                );
            }

            if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
                anyhow::bail!(
                    "Domain label contains invalid characters. Label: '{}'. \
                    Valid: alphanumeric and hyphen only.",
                    label
                );
            }

            if label.starts_with('-') || label.ends_with('-') {
                anyhow::bail!(
                    "Domain label cannot start or end with hyphen. Label: '{}'",
                    label
                );
            }
        }

        Ok(())
    }

    /// Build the engine configuration
    fn to_sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(&self.record_name, &self.zone_id, &self.api_token);

        config.address_source = match self.address_source.as_str() {
            "internal" => AddressSourceKind::Internal,
            _ => AddressSourceKind::External,
        };
        config.proxied = self.proxied;
        config.ttl = self.ttl;
        config.poll_interval_secs = self.poll_interval_secs;
        config.auto_update = self.auto_update;

        if let (Some(chat_id), Some(bot_token)) =
            (&self.telegram_chat_id, &self.telegram_bot_token)
        {
            config.notifications.telegram = Some(TelegramConfig {
                chat_id: chat_id.clone(),
                bot_token: bot_token.clone(),
            });
        }

        if let Some(webhook_url) = &self.discord_webhook_url {
            config.notifications.discord = Some(DiscordConfig {
                webhook_url: webhook_url.clone(),
            });
        }

        config
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting cfddnsd daemon");
    info!(
        "Managing record {} (poll interval {}s, auto-update {})",
        config.record_name, config.poll_interval_secs, config.auto_update
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire up the engine and run it until a shutdown signal arrives
async fn run_daemon(config: Config) -> Result<()> {
    let sync_config = config.to_sync_config();

    let address_source: Box<dyn AddressSource> = match sync_config.address_source {
        AddressSourceKind::External => match &config.address_url {
            Some(url) => Box::new(cfddns_addr::HttpAddressSource::with_url(url)?),
            None => Box::new(cfddns_addr::HttpAddressSource::new()?),
        },
        AddressSourceKind::Internal => Box::new(cfddns_addr::InternalAddressSource::new()),
    };

    let provider = Box::new(cfddns_cloudflare::CloudflareProvider::new(
        &config.api_token,
        &config.zone_id,
    )?);

    let notifiers: Vec<Box<dyn Notifier>> =
        cfddns_notify::from_config(&sync_config.notifications)?;
    if !notifiers.is_empty() {
        info!("Notification channels: {}", notifiers.len());
    }

    let (engine, mut observer) = SyncEngine::new(address_source, provider, notifiers, sync_config)?;

    let trigger = engine.trigger();
    let auto_update = engine.auto_update();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    // Relay engine events into the log
    let event_task = tokio::spawn(async move {
        while let Some(event) = observer.events.recv().await {
            match event {
                EngineEvent::Started => info!("Sync engine started"),
                EngineEvent::CycleCompleted { status } => {
                    info!(
                        "Cycle completed: {} synced={} address={:?}",
                        status.record_name, status.synced, status.current_address
                    );
                }
                EngineEvent::CycleFailed { reason } => {
                    warn!("Cycle failed: {}", reason);
                }
                EngineEvent::Stopped { reason } => {
                    info!("Sync engine stopped: {}", reason);
                }
            }
        }
    });

    let engine_task = tokio::spawn(async move {
        engine.run_with_shutdown(Some(shutdown_rx)).await
    });

    let signal_name = wait_for_shutdown(trigger, auto_update).await?;
    info!("Received shutdown signal: {}", signal_name);

    // A dropped receiver means the engine already exited on its own
    let _ = shutdown_tx.send(());

    match engine_task.await {
        Ok(result) => result.map_err(|e| anyhow::anyhow!("engine error: {e}"))?,
        Err(e) => anyhow::bail!("engine task panicked: {e}"),
    }

    event_task.abort();
    info!("Shutting down daemon");

    Ok(())
}

/// Wait for a shutdown signal, relaying control signals in the meantime
///
/// SIGUSR1 requests a manual sync cycle and SIGUSR2 toggles automatic
/// updates; both leave the daemon running.
#[cfg(unix)]
async fn wait_for_shutdown(
    trigger: cfddns_core::SyncTrigger,
    auto_update: cfddns_core::AutoUpdateSwitch,
) -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;
    let mut sigusr1 = signal(SignalKind::user_defined1())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGUSR1 handler: {}", e))?;
    let mut sigusr2 = signal(SignalKind::user_defined2())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGUSR2 handler: {}", e))?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => return Ok("SIGTERM"),
            _ = sigint.recv() => return Ok("SIGINT"),
            _ = sigusr1.recv() => {
                info!("Manual sync requested via SIGUSR1");
                trigger.trigger();
            }
            _ = sigusr2.recv() => {
                let enabled = auto_update.toggle();
                info!("Automatic updates toggled via SIGUSR2: now {}", enabled);
            }
        }
    }
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms; no control signals.
#[cfg(not(unix))]
async fn wait_for_shutdown(
    _trigger: cfddns_core::SyncTrigger,
    _auto_update: cfddns_core::AutoUpdateSwitch,
) -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
