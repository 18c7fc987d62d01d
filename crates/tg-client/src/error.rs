//! Client error types

use thiserror::Error;

use tg_core::StoreError;
use tg_protocol::ProtocolError;

/// Errors raised while fetching or launching tunnels
#[derive(Error, Debug)]
pub enum ClientError {
    /// Gist could not be read
    #[error(transparent)]
    Fetch(#[from] StoreError),

    /// Gist content is not a tunnel set
    #[error("Published tunnel data is invalid: {0}")]
    BlobParse(#[from] ProtocolError),

    /// Tunnel has no entry under `client.tunnels`
    #[error("Unknown tunnel '{0}'")]
    UnknownTunnel(String),

    /// Server is not publishing this tunnel
    #[error("Information about tunnel '{0}' cannot be found on Gist")]
    TunnelNotAvailable(String),

    /// Local entry has no `command`
    #[error("Command is not specified for tunnel '{0}'")]
    CommandNotSpecified(String),

    /// Shell could not be started
    #[error("Failed to run command for tunnel '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Several requested tunnels failed
    #[error("{} tunnel(s) failed: {}", .failures.len(), summarize(.failures))]
    Failed { failures: Vec<ClientError> },
}

impl ClientError {
    /// Tunnel this error is about, if it concerns a single tunnel
    pub fn tunnel(&self) -> Option<&str> {
        match self {
            ClientError::UnknownTunnel(name)
            | ClientError::TunnelNotAvailable(name)
            | ClientError::CommandNotSpecified(name)
            | ClientError::Spawn { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn summarize(failures: &[ClientError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
