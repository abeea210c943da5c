// # Cloudflare DNS Provider
//
// Cloudflare API v4 implementation of the `DnsProvider` seam.
//
// ## Contract
//
// - One HTTP request per method call, single attempt
// - Full error propagation to the engine (no retry, no backoff, no rate
//   limiting here; the next poll is the retry mechanism)
// - No caching of record state between calls
// - The API token never appears in logs or Debug output
//
// ## API Reference
//
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Both endpoints answer with an envelope `{"success": bool, "result": ...}`;
// a 200 with `success=false` is a failure.

use std::time::Duration;

use async_trait::async_trait;
use cfddns_core::traits::{DnsProvider, DnsRecord};
use cfddns_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Transport deadline for each API call
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Cloudflare DNS provider
///
/// Holds the zone scope and credentials; the record name travels with each
/// call so one client can serve any record in the zone.
pub struct CloudflareProvider {
    /// Cloudflare API token; never logged
    api_token: String,

    /// Zone the managed record lives in
    zone_id: String,

    /// API base URL, overridable for tests
    base_url: String,

    /// HTTP client with the transport timeout applied
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Response envelope shared by the list and update endpoints
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    result: Option<T>,
}

/// One record as the list endpoint reports it
#[derive(Debug, Deserialize)]
struct RecordPayload {
    id: String,
    content: String,
    #[serde(default)]
    proxied: bool,
}

/// Full record replacement body for the update endpoint
#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    r#type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        let zone_id = zone_id.into();

        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone id cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            zone_id,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Override the API base URL (for tests against a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Read the record by listing the zone filtered on name and taking the
    /// first match
    async fn get_record(&self, name: &str) -> Result<DnsRecord> {
        tracing::debug!(record = name, "looking up DNS record");

        let response = self
            .client
            .get(self.records_url())
            .query(&[("name", name)])
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("record lookup timed out: {e}"))
                } else {
                    Error::record_lookup(format!("HTTP request failed: {e}"))
                }
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::record_lookup(format!(
                "record lookup failed with status {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<Vec<RecordPayload>> = response
            .json()
            .await
            .map_err(|e| Error::record_lookup(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(Error::record_lookup("API reported success=false"));
        }

        let record = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::record_lookup(format!("no record named {name}")))?;

        Ok(DnsRecord {
            id: record.id,
            address: record.content,
            proxied: record.proxied,
        })
    }

    /// Replace the record with a full PUT (type fixed to "A")
    async fn update_record(
        &self,
        id: &str,
        name: &str,
        address: &str,
        ttl: u32,
        proxied: bool,
    ) -> Result<()> {
        tracing::info!(record = name, content = address, "updating DNS record");

        let payload = UpdatePayload {
            r#type: "A",
            name,
            content: address,
            ttl,
            proxied,
        };

        let response = self
            .client
            .put(format!("{}/{}", self.records_url(), id))
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("record update timed out: {e}"))
                } else {
                    Error::update(format!("HTTP request failed: {e}"))
                }
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::update(format!(
                "record update failed with status {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::update(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(Error::update("API reported success=false"));
        }

        tracing::info!(record = name, content = address, "DNS record updated");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(CloudflareProvider::new("", "zone").is_err());
        assert!(CloudflareProvider::new("token", "").is_err());
        assert!(CloudflareProvider::new("token", "zone").is_ok());
    }

    #[test]
    fn api_token_is_not_exposed_in_debug() {
        let provider = CloudflareProvider::new("secret_token_12345", "zone123").unwrap();

        let debug_str = format!("{provider:?}");
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("CloudflareProvider"));
        assert!(debug_str.contains("zone123"));
    }

    #[test]
    fn records_url_respects_base_override() {
        let provider = CloudflareProvider::new("token", "zone123")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/client/v4");

        assert_eq!(
            provider.records_url(),
            "http://127.0.0.1:9000/client/v4/zones/zone123/dns_records"
        );
    }

    #[test]
    fn list_envelope_parses_first_record() {
        let body = r#"{
            "success": true,
            "errors": [],
            "result": [
                {"id": "abc123", "type": "A", "name": "host.example.com",
                 "content": "1.2.3.4", "proxied": true, "ttl": 120},
                {"id": "def456", "type": "A", "name": "host.example.com",
                 "content": "9.9.9.9", "proxied": false, "ttl": 300}
            ]
        }"#;

        let envelope: ApiEnvelope<Vec<RecordPayload>> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);

        let first = envelope.result.unwrap().into_iter().next().unwrap();
        assert_eq!(first.id, "abc123");
        assert_eq!(first.content, "1.2.3.4");
        assert!(first.proxied);
    }

    #[test]
    fn envelope_without_result_defaults_to_none() {
        let body = r#"{"success": false, "errors": [{"code": 9103}]}"#;
        let envelope: ApiEnvelope<Vec<RecordPayload>> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
    }

    #[test]
    fn update_payload_serializes_full_replacement() {
        let payload = UpdatePayload {
            r#type: "A",
            name: "host.example.com",
            content: "5.6.7.8",
            ttl: 120,
            proxied: false,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "A",
                "name": "host.example.com",
                "content": "5.6.7.8",
                "ttl": 120,
                "proxied": false
            })
        );
    }
}
