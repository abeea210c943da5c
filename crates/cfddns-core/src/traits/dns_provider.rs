// # DNS Provider Trait
//
// Defines the interface for reading and writing the managed DNS record.
//
// ## Implementations
//
// - Cloudflare API v4: `cfddns-cloudflare` crate
//
// ## Contract
//
// Providers are single-shot and stateless: one API call per method, full
// error propagation, no retry or backoff (the next poll is the retry
// mechanism), no caching of record state between calls. The engine owns
// all update decisions; a provider never decides whether a write is needed.

use async_trait::async_trait;

/// A remote DNS record as the provider reports it
///
/// `address` is the record content verbatim; the engine compares it with
/// exact string equality against the resolved current address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record content (the address)
    pub address: String,
    /// Whether the record is proxied
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read the record with the given name
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: the first record matching `name`
    /// - `Err(Error)`: the read failed or no record matched
    async fn get_record(&self, name: &str) -> Result<DnsRecord, crate::Error>;

    /// Replace the record's content
    ///
    /// This is a full record replacement: type, name, content, ttl and
    /// proxied flag are all written.
    ///
    /// # Parameters
    ///
    /// - `id`: provider-assigned record identifier from [`get_record`](Self::get_record)
    /// - `name`: the record name
    /// - `address`: the new record content
    /// - `ttl`: desired TTL (or the provider's automatic sentinel)
    /// - `proxied`: desired proxied flag
    async fn update_record(
        &self,
        id: &str,
        name: &str,
        address: &str,
        ttl: u32,
        proxied: bool,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
