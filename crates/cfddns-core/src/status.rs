//! Published synchronization status and the shared control bits
//!
//! `SyncStatus` is owned exclusively by the engine and published through a
//! watch channel: observers see either the previous complete snapshot or the
//! new one, never a partially written value. The two atomics here are the
//! only other state shared with the outside, both single-writer from the
//! engine's point of view (the trigger adapter sets the flag, only the
//! engine clears it).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the reconciliation state, published after every successful
/// cycle
///
/// A failed cycle leaves the previously published snapshot intact
/// (stale-but-valid); the failure surfaces through the engine's event
/// channel instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// Record address and proxied flag both match the desired state
    pub synced: bool,

    /// Address resolved this cycle
    pub current_address: Option<String>,

    /// Record content as read this cycle, before any update
    pub record_address: Option<String>,

    /// The managed record name
    pub record_name: String,

    /// See the engine docs for what "last sync" means exactly
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl SyncStatus {
    /// The startup snapshot, before any cycle has completed
    pub fn empty(record_name: impl Into<String>) -> Self {
        Self {
            synced: false,
            current_address: None,
            record_address: None,
            record_name: record_name.into(),
            last_sync_time: None,
        }
    }
}

/// Single-slot manual-sync mailbox
///
/// Set by the trigger adapter, consumed (cleared) by the engine at the start
/// of the next cycle it influences. A pending trigger may be superseded by a
/// scheduled cycle; that cycle then runs as the manual one.
#[derive(Debug, Clone, Default)]
pub struct ManualSyncFlag {
    requested: Arc<AtomicBool>,
}

impl ManualSyncFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a manual sync
    pub fn set(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Consume the request, returning whether one was pending
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    /// Peek without consuming (observability only)
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Live auto-update toggle
///
/// Starts from the configured value and can be flipped at runtime by a
/// control surface; the engine reads it once per cycle. Persisting the value
/// back to a settings store is the host's concern.
#[derive(Debug, Clone)]
pub struct AutoUpdateSwitch {
    enabled: Arc<AtomicBool>,
}

impl AutoUpdateSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn get(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Flip the switch, returning the new value
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_flag_is_consumed_once() {
        let flag = ManualSyncFlag::new();
        assert!(!flag.take());

        flag.set();
        flag.set(); // coalesces
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn auto_update_switch_toggles() {
        let switch = AutoUpdateSwitch::new(true);
        assert!(switch.get());
        assert!(!switch.toggle());
        assert!(!switch.get());
        assert!(switch.toggle());

        // Clones share the underlying bit
        let other = switch.clone();
        other.set(false);
        assert!(!switch.get());
    }

    #[test]
    fn empty_status_has_no_addresses() {
        let status = SyncStatus::empty("host.example.com");
        assert!(!status.synced);
        assert!(status.current_address.is_none());
        assert!(status.record_address.is_none());
        assert!(status.last_sync_time.is_none());
        assert_eq!(status.record_name, "host.example.com");
    }
}
