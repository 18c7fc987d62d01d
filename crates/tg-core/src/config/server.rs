//! Server role configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::serde_utils;
use crate::error::ConfigError;

/// ngrok's local control API when not configured otherwise
pub const DEFAULT_NGROK_WEBHOOK_URL: &str = "http://localhost:4040";

const DEFAULT_NGROK_COMMAND: &str = "ngrok";
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Configuration for the tunnel-publishing server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Token used to update the gist
    pub github_token: String,

    /// ngrok executable
    pub ngrok_command: String,

    /// ngrok config files, later files override earlier ones
    pub ngrok_config: Vec<PathBuf>,

    /// Base URL of ngrok's local control API
    pub ngrok_webhook_url: String,

    /// Tunnels to start when none are given on the command line
    pub tunnels: Vec<String>,

    /// How long to wait for ngrok to report every tunnel
    pub ready_timeout: Duration,

    /// Delay between control API polls
    pub poll_interval: Duration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawServerConfig {
    github_token: Option<String>,
    ngrok_command: Option<String>,
    #[serde(deserialize_with = "serde_utils::opt_one_or_many")]
    ngrok_config: Option<Vec<PathBuf>>,
    ngrok_webhook_url: Option<String>,
    tunnels: Option<Vec<String>>,
    ready_timeout: Option<u64>,
    poll_interval_ms: Option<u64>,
}

impl ServerConfig {
    pub(super) fn from_raw(raw: Option<RawServerConfig>) -> Result<Self, ConfigError> {
        let raw = raw.unwrap_or_default();

        let github_token = raw
            .github_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::GitHubTokenNotFound)?;

        let ngrok_config = match raw.ngrok_config {
            Some(paths) if !paths.is_empty() => paths.iter().map(|p| expand_home(p)).collect(),
            _ => vec![default_ngrok_config_path()],
        };

        Ok(Self {
            github_token,
            ngrok_command: raw
                .ngrok_command
                .unwrap_or_else(|| DEFAULT_NGROK_COMMAND.to_string()),
            ngrok_config,
            ngrok_webhook_url: raw
                .ngrok_webhook_url
                .unwrap_or_else(|| DEFAULT_NGROK_WEBHOOK_URL.to_string()),
            tunnels: raw.tunnels.unwrap_or_default(),
            ready_timeout: Duration::from_secs(
                raw.ready_timeout.unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
            ),
            poll_interval: Duration::from_millis(
                raw.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
        })
    }

    /// Control API endpoint listing live tunnels
    pub fn tunnels_api_url(&self) -> String {
        format!("{}/api/tunnels", self.ngrok_webhook_url.trim_end_matches('/'))
    }
}

/// ngrok's own default config location for this platform
pub fn default_ngrok_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_default();

    #[cfg(target_os = "windows")]
    {
        home.join("AppData").join("Local").join("ngrok").join("ngrok.yml")
    }

    #[cfg(target_os = "macos")]
    {
        home.join("Library")
            .join("Application Support")
            .join("ngrok")
            .join("ngrok.yml")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        home.join(".config").join("ngrok").join("ngrok.yml")
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().unwrap_or_default().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
