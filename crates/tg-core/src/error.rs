//! Core error types for tunnelgist

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file is not found at {0}")]
    NotFound(PathBuf),

    /// Config file is not valid YAML of the expected shape
    #[error("Config syntax error: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// Root `gist_id` is absent
    #[error("`gist_id` is not specified in config")]
    MissingGistId,

    /// `server.github_token` is absent
    #[error("GitHub token is not specified")]
    GitHubTokenNotFound,

    /// Config file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shared blob store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No gist with this id
    #[error("Gist with id of {id} does not exist")]
    NotFound { id: String },

    /// Gist exists but has no such file
    #[error("Gist with id of {id} and file {filename} does not exist")]
    FileNotFound { id: String, filename: String },

    /// Write attempted without an access token
    #[error("An access token is required to update a gist")]
    MissingToken,

    /// Store answered with an unexpected status
    #[error("Gist API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store response could not be decoded
    #[error("Failed to decode gist API response: {0}")]
    Decode(#[source] reqwest::Error),
}
