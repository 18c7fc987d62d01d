//! Protocol error types

use thiserror::Error;

/// Errors that can occur while building or decoding tunnel descriptors
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Public URL could not be parsed
    #[error("Invalid public URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Public URL parsed but carries no host
    #[error("Public URL '{0}' has no host")]
    MissingHost(String),

    /// Published payload is not a valid tunnel set
    #[error("Failed to decode tunnel set: {0}")]
    Decode(#[source] serde_json::Error),

    /// Tunnel set could not be serialized
    #[error("Failed to encode tunnel set: {0}")]
    Encode(#[source] serde_json::Error),
}
