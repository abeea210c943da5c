// # Address Source Trait
//
// Defines the interface for resolving the caller's current network address.
//
// ## Implementations
//
// - HTTP echo service (external address): `cfddns-addr` crate
// - Internal (local-network) detection: explicit unimplemented stub
//
// ## Why strings, not `IpAddr`
//
// The engine compares the resolved address against the record content with
// exact string equality. Parsing into `IpAddr` would silently normalize
// IPv6 spellings and change the comparison semantics, so addresses stay
// opaque strings end to end.

use async_trait::async_trait;

/// Trait for current-address resolution
///
/// One call per reconciliation cycle; a single attempt, no caching. Errors
/// abort the cycle before any provider call is made.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Resolve the current address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the trimmed, non-empty address text
    /// - `Err(Error)`: resolution failed, timed out, or is unsupported
    async fn current_address(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
