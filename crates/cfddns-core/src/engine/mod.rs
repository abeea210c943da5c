//! Core synchronization engine
//!
//! The SyncEngine owns the reconciliation loop for one DNS record:
//!
//! ```text
//! tick / manual trigger
//!         │
//!         ▼
//! ┌───────────────┐   current_address()   ┌───────────────┐
//! │  SyncEngine   │──────────────────────▶│ AddressSource │
//! │  reconcile()  │                       └───────────────┘
//! └───────────────┘   get_record() /      ┌───────────────┐
//!         │           update_record()     │  DnsProvider  │
//!         │──────────────────────────────▶└───────────────┘
//!         │           notify() (maybe)    ┌───────────────┐
//!         │──────────────────────────────▶│   Notifiers   │
//!         ▼                               └───────────────┘
//!  SyncStatus snapshot (watch) + EngineEvent (mpsc)
//! ```
//!
//! ## Cycle contract
//!
//! 1. Snapshot and clear the manual-sync flag
//! 2. Resolve the current address; failure aborts the cycle before any
//!    provider call
//! 3. Read the record; comparison is exact string equality on the address
//!    plus the proxied flag
//! 4. Write if the cycle is manual, or if mismatched and auto-update is on;
//!    a manual cycle on an already-correct record writes nothing but still
//!    counts as a successful sync
//! 5. Publish the status snapshot (failed cycles publish nothing)
//!
//! `last_sync_time` is refreshed on every successful non-manual cycle while
//! auto-update is enabled, whether or not a write happened. It records "last
//! time the engine actively checked and was responsible for keeping sync",
//! not "last time a change was made". Downstream consumers depend on this.
//!
//! ## Concurrency
//!
//! At most one cycle is in flight: the run loop is sequential and a manual
//! trigger during a cycle coalesces into the flag for the next loop turn.
//! Only the engine writes the status snapshot or clears the flag.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::status::{AutoUpdateSwitch, ManualSyncFlag, SyncStatus};
use crate::traits::{AddressSource, DnsProvider, Notifier};

/// Capacity of the engine event channel; events are dropped (with a warning)
/// beyond this.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started,

    /// A reconciliation cycle completed and published this status
    CycleCompleted { status: SyncStatus },

    /// A reconciliation cycle failed; the previous status stands
    CycleFailed { reason: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Handle for requesting an immediate reconciliation cycle
///
/// Cheap to clone and safe to use from any task. Triggering while a cycle is
/// in flight queues exactly one follow-up cycle; repeated triggers coalesce.
#[derive(Clone)]
pub struct SyncTrigger {
    flag: ManualSyncFlag,
    notify: Arc<Notify>,
}

impl SyncTrigger {
    /// Request a manual sync now
    pub fn trigger(&self) {
        self.flag.set();
        self.notify.notify_one();
    }
}

/// Read-only observation surfaces handed out at engine construction
pub struct SyncObserver {
    /// Latest published status snapshot
    pub status: watch::Receiver<SyncStatus>,

    /// Engine lifecycle and cycle-outcome events
    pub events: mpsc::Receiver<EngineEvent>,
}

impl SyncObserver {
    /// Clone of the latest published snapshot
    pub fn latest(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Stream of status snapshots, starting from the current one
    pub fn status_stream(&self) -> WatchStream<SyncStatus> {
        WatchStream::new(self.status.clone())
    }
}

/// Core synchronization engine for one DNS record
pub struct SyncEngine {
    /// Current-address resolution
    address_source: Box<dyn AddressSource>,

    /// Record read/write access
    provider: Box<dyn DnsProvider>,

    /// Best-effort notification channels
    notifiers: Vec<Box<dyn Notifier>>,

    /// Immutable per-cycle configuration
    config: SyncConfig,

    /// Live auto-update toggle (seeded from config)
    auto_update: AutoUpdateSwitch,

    /// Manual-sync mailbox, cleared at the start of each cycle
    manual_flag: ManualSyncFlag,

    /// Wakes the run loop for an on-demand cycle
    trigger_notify: Arc<Notify>,

    /// Status publisher (single writer)
    status_tx: watch::Sender<SyncStatus>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// Validates the configuration and hands back the engine together with
    /// its observation surfaces.
    pub fn new(
        address_source: Box<dyn AddressSource>,
        provider: Box<dyn DnsProvider>,
        notifiers: Vec<Box<dyn Notifier>>,
        config: SyncConfig,
    ) -> Result<(Self, SyncObserver)> {
        config.validate()?;

        let (status_tx, status_rx) = watch::channel(SyncStatus::empty(&config.record_name));
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            address_source,
            provider,
            notifiers,
            auto_update: AutoUpdateSwitch::new(config.auto_update),
            manual_flag: ManualSyncFlag::new(),
            trigger_notify: Arc::new(Notify::new()),
            config,
            status_tx,
            event_tx,
        };

        let observer = SyncObserver {
            status: status_rx,
            events: event_rx,
        };

        Ok((engine, observer))
    }

    /// Handle for the manual-sync control surface
    pub fn trigger(&self) -> SyncTrigger {
        SyncTrigger {
            flag: self.manual_flag.clone(),
            notify: Arc::clone(&self.trigger_notify),
        }
    }

    /// Handle for the auto-update control surface
    pub fn auto_update(&self) -> AutoUpdateSwitch {
        self.auto_update.clone()
    }

    /// Run the engine until SIGINT
    ///
    /// Cycles run on every poll-interval tick (the first one immediately)
    /// and on every manual trigger.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine with a controlled shutdown signal
    ///
    /// Used by the daemon (which owns signal handling) and by tests that
    /// need deterministic shutdown.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(EngineEvent::Started);
        info!(
            record = %self.config.record_name,
            interval_secs = self.config.poll_interval_secs,
            "sync engine started"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        if let Some(mut rx) = shutdown_rx {
            loop {
                tokio::select! {
                    _ = interval.tick() => self.run_cycle().await,
                    _ = self.trigger_notify.notified() => self.run_cycle().await,
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            loop {
                tokio::select! {
                    _ = interval.tick() => self.run_cycle().await,
                    _ = self.trigger_notify.notified() => self.run_cycle().await,
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one cycle and report its outcome; never propagates the error
    /// (the loop keeps running, the next trigger is the retry)
    async fn run_cycle(&self) {
        match self.reconcile().await {
            Ok(status) => {
                debug!(synced = status.synced, "reconciliation cycle completed");
                self.emit_event(EngineEvent::CycleCompleted { status });
            }
            Err(e) => {
                error!("reconciliation cycle failed: {}", e);
                self.emit_event(EngineEvent::CycleFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Execute one reconciliation cycle
    ///
    /// Public so that on-demand callers (and tests) can run a cycle without
    /// the scheduler; the caller is responsible for not running two cycles
    /// concurrently.
    pub async fn reconcile(&self) -> Result<SyncStatus> {
        let is_manual = self.manual_flag.take();
        let auto_update = self.auto_update.get();

        let current_address = match self.address_source.current_address().await {
            Ok(address) if !address.is_empty() => address,
            Ok(_) => {
                return Err(Error::address_resolution(
                    "address source returned an empty response",
                ));
            }
            Err(e @ Error::AddressResolution(_)) => return Err(e),
            Err(e) => return Err(Error::address_resolution(e.to_string())),
        };

        let record = self
            .provider
            .get_record(&self.config.record_name)
            .await
            .map_err(|e| match e {
                e @ Error::RecordLookup(_) => e,
                other => Error::record_lookup(other.to_string()),
            })?;

        let mut synced =
            record.address == current_address && record.proxied == self.config.proxied;
        let mut last_sync_time = self.status_tx.borrow().last_sync_time;

        if is_manual || (!synced && auto_update) {
            if !synced {
                info!(
                    record = %self.config.record_name,
                    old = %record.address,
                    new = %current_address,
                    manual = is_manual,
                    "record out of sync, updating"
                );
                self.provider
                    .update_record(
                        &record.id,
                        &self.config.record_name,
                        &current_address,
                        self.config.ttl,
                        self.config.proxied,
                    )
                    .await
                    .map_err(|e| match e {
                        e @ Error::Update(_) => e,
                        other => Error::update(other.to_string()),
                    })?;

                self.send_notifications(&current_address, &record.address)
                    .await;
                synced = true;
                last_sync_time = Some(chrono::Utc::now());
            } else {
                // Already synced but a manual sync was requested; no write,
                // still counts as a successful sync.
                info!(record = %self.config.record_name, "record already synced (manual sync)");
                last_sync_time = Some(chrono::Utc::now());
            }
        } else if !synced {
            debug!(
                record = %self.config.record_name,
                "record out of sync but auto-update is disabled"
            );
        }

        // "Last time the engine was responsible for keeping sync", not "last
        // time a change was made".
        if auto_update && !is_manual {
            last_sync_time = Some(chrono::Utc::now());
        }

        let status = SyncStatus {
            synced,
            current_address: Some(current_address),
            record_address: Some(record.address),
            record_name: self.config.record_name.clone(),
            last_sync_time,
        };
        self.status_tx.send_replace(status.clone());

        Ok(status)
    }

    /// Dispatch one message to every configured channel, independently
    async fn send_notifications(&self, new_address: &str, old_address: &str) {
        if self.notifiers.is_empty() {
            return;
        }

        let message = format!(
            "{} DNS Record Updated To: {} (was {})",
            self.config.record_name, new_address, old_address
        );

        for notifier in &self.notifiers {
            match notifier.notify(&message).await {
                Ok(()) => {
                    info!(channel = notifier.channel_name(), "notification sent");
                }
                Err(e) => {
                    warn!(
                        channel = notifier.channel_name(),
                        "notification failed: {}", e
                    );
                }
            }
        }
    }

    /// Emit an engine event, dropping it with a warning if the channel is full
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping engine event");
        }
    }
}
