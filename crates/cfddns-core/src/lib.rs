// # cfddns-core
//
// Core library for the cfddns record synchronization agent.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a single DNS
// record aligned with the caller's current network address:
// - **AddressSource**: Trait for resolving the current address
// - **DnsProvider**: Trait for reading and writing the managed DNS record
// - **Notifier**: Trait for best-effort update notifications
// - **SyncEngine**: The reconciliation loop (compare → maybe correct → publish)
//
// ## Design Principles
//
// 1. **Single-writer status**: only the engine mutates `SyncStatus`; observers
//    read atomic snapshots through a watch channel
// 2. **Polling-based**: one reconciliation cycle per interval tick or manual
//    trigger, never two in flight
// 3. **No intra-cycle retry**: a failed cycle surfaces its error and the next
//    trigger is the retry mechanism
// 4. **Library-First**: the engine is usable without the daemon binary

pub mod config;
pub mod engine;
pub mod error;
pub mod status;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    AddressSourceKind, DiscordConfig, NotificationConfig, SyncConfig, TelegramConfig,
};
pub use engine::{EngineEvent, SyncEngine, SyncObserver, SyncTrigger};
pub use error::{Error, Result};
pub use status::{AutoUpdateSwitch, ManualSyncFlag, SyncStatus};
pub use traits::{AddressSource, DnsProvider, DnsRecord, Notifier};
