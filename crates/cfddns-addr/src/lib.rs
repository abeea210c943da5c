// # Address Sources
//
// Implementations of the `AddressSource` seam.
//
// - `HttpAddressSource`: the external (public) address, as seen by a
//   plain-text HTTP echo service. One GET per cycle, trimmed body, no
//   caching.
// - `InternalAddressSource`: local-network detection is not supported;
//   the stub fails loudly instead of returning nothing.
//
// The resolved address stays a string: the engine compares it against the
// record content with exact string equality.

use std::time::Duration;

use async_trait::async_trait;
use cfddns_core::traits::AddressSource;
use cfddns_core::{Error, Result};

/// Default address-echo endpoint
pub const DEFAULT_ADDRESS_URL: &str = "https://checkip.amazonaws.com";

/// Transport deadline for the echo request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// External-address source backed by an HTTP echo service
#[derive(Debug)]
pub struct HttpAddressSource {
    /// Echo endpoint returning the caller's address as plain text
    url: String,

    /// HTTP client with the transport timeout applied
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a source against the default echo endpoint
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_ADDRESS_URL)
    }

    /// Create a source against a custom echo endpoint
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::config("address echo URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl AddressSource for HttpAddressSource {
    async fn current_address(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("address echo timed out: {e}"))
            } else {
                Error::address_resolution(format!("HTTP request failed: {e}"))
            }
        })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::address_resolution(format!(
                "address echo failed with status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::address_resolution(format!("failed to read response: {e}")))?;

        let address = body.trim();
        if address.is_empty() {
            return Err(Error::address_resolution(
                "address echo returned an empty body",
            ));
        }

        tracing::debug!(address, "resolved external address");
        Ok(address.to_string())
    }

    fn source_name(&self) -> &'static str {
        "external"
    }
}

/// Unsupported local-network address source
///
/// Kept as an explicit stub so a misconfigured instance fails every cycle
/// with a clear error rather than silently resolving nothing.
#[derive(Debug, Default)]
pub struct InternalAddressSource;

impl InternalAddressSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AddressSource for InternalAddressSource {
    async fn current_address(&self) -> Result<String> {
        tracing::warn!("internal address detection is not implemented");
        Err(Error::address_resolution(
            "internal address detection is not implemented",
        ))
    }

    fn source_name(&self) -> &'static str {
        "internal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_uses_echo_endpoint() {
        let source = HttpAddressSource::new().unwrap();
        assert_eq!(source.url, DEFAULT_ADDRESS_URL);
        assert_eq!(source.source_name(), "external");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(HttpAddressSource::with_url("").is_err());
    }

    #[tokio::test]
    async fn internal_source_fails_explicitly() {
        let source = InternalAddressSource::new();
        let err = source.current_address().await.unwrap_err();
        assert!(matches!(err, Error::AddressResolution(_)), "got: {err}");
        assert!(err.to_string().contains("not implemented"), "got: {err}");
    }
}
