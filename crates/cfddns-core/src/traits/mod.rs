//! Core traits for the record synchronization agent
//!
//! This module defines the abstract interfaces the engine reconciles over.
//!
//! - [`AddressSource`]: Resolve the caller's current address
//! - [`DnsProvider`]: Read and write the managed DNS record
//! - [`Notifier`]: Best-effort update notifications

pub mod address_source;
pub mod dns_provider;
pub mod notifier;

pub use address_source::AddressSource;
pub use dns_provider::{DnsProvider, DnsRecord};
pub use notifier::Notifier;
