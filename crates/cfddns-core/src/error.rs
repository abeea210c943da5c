//! Error types for the record synchronization agent
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for synchronization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the record synchronization agent
///
/// The first four variants form the reconciliation-path taxonomy: each one
/// aborts the current cycle and is reported to the scheduler as a failed
/// cycle. `Notification` never crosses a cycle boundary, it is logged by the
/// engine's dispatch and swallowed.
#[derive(Error, Debug)]
pub enum Error {
    /// Current-address resolution failed or returned nothing usable
    #[error("address resolution error: {0}")]
    AddressResolution(String),

    /// The managed DNS record could not be read or does not exist
    #[error("record lookup error: {0}")]
    RecordLookup(String),

    /// The provider rejected or failed the record write
    #[error("update error: {0}")]
    Update(String),

    /// A network call exceeded its deadline
    #[error("timeout: {0}")]
    Timeout(String),

    /// A notification channel failed (logged only, never propagated)
    #[error("notification error: {0}")]
    Notification(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an address resolution error
    pub fn address_resolution(msg: impl Into<String>) -> Self {
        Self::AddressResolution(msg.into())
    }

    /// Create a record lookup error
    pub fn record_lookup(msg: impl Into<String>) -> Self {
        Self::RecordLookup(msg.into())
    }

    /// Create an update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
