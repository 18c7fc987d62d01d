//! Server error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::ngrok::ApiError;
use tg_core::StoreError;
use tg_protocol::ProtocolError;

/// Errors raised while preparing, starting or polling ngrok
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// ngrok executable could not be run
    #[error("Failed to execute `{command}`: {source}")]
    NgrokNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// `ngrok config check` rejected the config files
    #[error("Bad ngrok config file; run `ngrok config check` to see details: {0}")]
    NgrokBadConfig(String),

    /// An ngrok config file could not be read or parsed
    #[error("Failed to read ngrok config {path}: {reason}")]
    TunnelConfigRead { path: PathBuf, reason: String },

    /// No tunnels were requested
    #[error("Tunnels are not specified")]
    TunnelsNotSpecified,

    /// A requested tunnel is not defined in any ngrok config file
    #[error("Unknown tunnel {0}")]
    UnknownTunnel(String),

    /// ngrok could not be spawned
    #[error("Failed to start ngrok: {0}")]
    Spawn(#[source] std::io::Error),

    /// Operation requires a running daemon
    #[error("ngrok has not been started")]
    NotStarted,

    /// ngrok never reported every requested tunnel
    #[error("ngrok reported {reported} of {expected} tunnels after {waited:?}")]
    DaemonReadyTimeout {
        waited: Duration,
        reported: usize,
        expected: usize,
    },

    /// ngrok exited before its tunnels were ready
    #[error("ngrok exited before tunnels were ready ({0})")]
    DaemonExited(String),

    /// Control API failed with something other than "not listening yet"
    #[error("ngrok API error: {0}")]
    Api(#[from] ApiError),

    /// ngrok reported a tunnel with an unusable public URL
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Waiting on the ngrok process failed
    #[error("Failed to wait for ngrok: {0}")]
    Wait(#[source] std::io::Error),
}

/// Errors raised while publishing a tunnel set
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Encode(#[from] ProtocolError),

    #[error("Failed to publish tunnels: {0}")]
    Store(#[from] StoreError),
}

/// Top-level error for a server run
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
