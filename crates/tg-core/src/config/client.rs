//! Client role configuration

use serde::Deserialize;
use std::collections::BTreeMap;

/// Local launch settings for one tunnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientTunnel {
    /// Shell command template with `{NAME}`, `{PORT}`, ... placeholders
    #[serde(default)]
    pub command: Option<String>,
}

/// Configuration for the resolving client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Launch templates keyed by tunnel name
    pub tunnels: BTreeMap<String, ClientTunnel>,

    /// Token for reading private gists
    pub github_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawClientConfig {
    tunnels: Option<BTreeMap<String, Option<ClientTunnel>>>,
    github_token: Option<String>,
}

impl ClientConfig {
    pub(super) fn from_raw(raw: Option<RawClientConfig>) -> Self {
        let raw = raw.unwrap_or_default();

        Self {
            tunnels: raw
                .tunnels
                .unwrap_or_default()
                .into_iter()
                .map(|(name, tunnel)| (name, tunnel.unwrap_or_default()))
                .collect(),
            github_token: raw.github_token.filter(|t| !t.trim().is_empty()),
        }
    }
}
