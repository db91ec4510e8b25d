//! Error types for model providers.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a model provider.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider API returned a non-success status.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed before a response arrived (connection refused, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// Provider answered but produced no usable output.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure is transient (network or upstream status).
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Request(_) | Error::ProviderApi(_))
    }
}
