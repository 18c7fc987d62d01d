//! ngrok local control API

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use tg_protocol::{ProtocolError, PublishedTunnelSet, TunnelDescriptor};

/// One tunnel as reported by `GET /api/tunnels`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiTunnel {
    pub name: String,
    #[serde(rename = "ID", default)]
    pub id: String,
    pub public_url: String,
    #[serde(default)]
    pub config: ApiTunnelConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiTunnelConfig {
    #[serde(default)]
    pub addr: String,
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<ApiTunnel>,
}

impl ApiTunnel {
    /// Canonical descriptor for this tunnel
    pub fn to_descriptor(&self) -> Result<TunnelDescriptor, ProtocolError> {
        TunnelDescriptor::from_public_url(
            self.name.as_str(),
            self.id.as_str(),
            self.config.addr.as_str(),
            self.public_url.as_str(),
        )
    }

    /// Map a full API listing into the set to publish
    pub fn into_set(tunnels: &[ApiTunnel]) -> Result<PublishedTunnelSet, ProtocolError> {
        tunnels.iter().map(ApiTunnel::to_descriptor).collect()
    }
}

/// Control API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Nothing is listening yet; ngrok is still starting
    #[error("ngrok API is not listening yet: {0}")]
    NotListening(String),

    /// Request got no answer in time
    #[error("ngrok API did not answer within {0:?}")]
    TimedOut(Duration),

    /// API answered with an unexpected status
    #[error("ngrok API returned {0}")]
    Status(u16),

    /// Any other transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// API response was not a tunnel list
    #[error("Failed to decode ngrok API response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Whether polling should simply try again
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::NotListening(_) | ApiError::TimedOut(_))
    }
}

/// Source of the live tunnel listing
#[async_trait]
pub trait TunnelApi: Send + Sync {
    async fn list_tunnels(&self) -> Result<Vec<ApiTunnel>, ApiError>;
}

/// Per-request limit for a control API call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for ngrok's control API
#[derive(Debug, Clone)]
pub struct NgrokApi {
    http: reqwest::Client,
    tunnels_url: String,
    request_timeout: Duration,
}

impl NgrokApi {
    /// `tunnels_url` is the full `.../api/tunnels` endpoint
    pub fn new(tunnels_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            tunnels_url: tunnels_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Give up on a single request after `timeout`
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl TunnelApi for NgrokApi {
    async fn list_tunnels(&self) -> Result<Vec<ApiTunnel>, ApiError> {
        let response = self
            .http
            .get(&self.tunnels_url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ApiError::NotListening(e.to_string())
                } else if e.is_timeout() {
                    ApiError::TimedOut(self.request_timeout)
                } else {
                    ApiError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        let list: TunnelList = response.json().await.map_err(ApiError::Decode)?;
        Ok(list.tunnels)
    }
}
