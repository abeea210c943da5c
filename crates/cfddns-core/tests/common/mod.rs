//! Test doubles and common utilities for the reconciliation contract tests
//!
//! The mocks are cheap clones over shared atomics so a test can hand one
//! side to the engine and keep the other side for assertions.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cfddns_core::config::SyncConfig;
use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{AddressSource, DnsProvider, DnsRecord, Notifier};

/// An address source with a settable address; can be switched to fail every
/// call with a transport timeout
#[derive(Clone)]
pub struct MockAddressSource {
    address: Arc<Mutex<String>>,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MockAddressSource {
    pub fn new(address: &str) -> Self {
        Self {
            address: Arc::new(Mutex::new(address.to_string())),
            fail: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every call times out
    pub fn failing() -> Self {
        let source = Self::new("unused");
        source.fail.store(true, Ordering::SeqCst);
        source
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = address.to_string();
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for MockAddressSource {
    async fn current_address(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::timeout("address echo deadline exceeded"));
        }
        Ok(self.address.lock().unwrap().clone())
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// One recorded write against the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub ttl: u32,
    pub proxied: bool,
}

/// A provider holding one in-memory record; writes mutate it, so a second
/// cycle observes the corrected remote state
#[derive(Clone)]
pub struct MockDnsProvider {
    record: Arc<Mutex<DnsRecord>>,
    lookup_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<RecordedUpdate>>>,
    fail_lookup: Arc<AtomicBool>,
    fail_update: Arc<AtomicBool>,
}

impl MockDnsProvider {
    pub fn new(address: &str, proxied: bool) -> Self {
        Self {
            record: Arc::new(Mutex::new(DnsRecord {
                id: "rec-1".to_string(),
                address: address.to_string(),
                proxied,
            })),
            lookup_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
            fail_lookup: Arc::new(AtomicBool::new(false)),
            fail_update: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_lookups(&self) {
        self.fail_lookup.store(true, Ordering::SeqCst);
    }

    pub fn fail_updates(&self) {
        self.fail_update.store(true, Ordering::SeqCst);
    }

    pub fn lookup_call_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn record(&self) -> DnsRecord {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(&self, name: &str) -> Result<DnsRecord> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Error::record_lookup(format!("no record named {name}")));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn update_record(
        &self,
        id: &str,
        name: &str,
        address: &str,
        ttl: u32,
        proxied: bool,
    ) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Error::update("provider reported success=false"));
        }

        self.updates.lock().unwrap().push(RecordedUpdate {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            ttl,
            proxied,
        });

        let mut record = self.record.lock().unwrap();
        record.address = address.to_string();
        record.proxied = proxied;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A notifier recording every delivery attempt
#[derive(Clone)]
pub struct MockNotifier {
    name: &'static str,
    attempts: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl MockNotifier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attempts: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A channel that rejects every message
    pub fn failing(name: &'static str) -> Self {
        let notifier = Self::new(name);
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.attempts.lock().unwrap().push(message.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::notification("channel rejected message"));
        }
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        self.name
    }
}

/// A minimal valid configuration for one managed record
pub fn test_config(record_name: &str) -> SyncConfig {
    SyncConfig::new(record_name, "zone-test", "token-test")
}
