//! Tunnel resolver and launcher
//!
//! Every invocation fetches the published set afresh; nothing is cached
//! between runs. Each requested tunnel is resolved and launched on its own,
//! so one bad name does not stop the others from being attempted.

use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::Command;

use tg_core::config::{ClientConfig, ClientSettings, GistConfig};
use tg_core::BlobStore;
use tg_protocol::PublishedTunnelSet;

use crate::error::ClientError;
use crate::template::render_command;

/// A command that was run for one tunnel
#[derive(Debug)]
pub struct Launched {
    pub name: String,
    pub command: String,
    pub status: ExitStatus,
}

/// Resolves requested tunnels against the published set and runs them
pub struct Launcher {
    store: Arc<dyn BlobStore>,
    gist: GistConfig,
    config: ClientConfig,
}

impl Launcher {
    pub fn new(settings: ClientSettings, store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            gist: settings.gist,
            config: settings.client,
        }
    }

    /// Read and parse the currently published tunnel set
    pub async fn fetch(&self) -> Result<PublishedTunnelSet, ClientError> {
        let content = self.store.get(&self.gist.id, &self.gist.filename).await?;
        let published = PublishedTunnelSet::decode(&content)?;

        for tunnel in published.iter().filter(|t| !t.is_consistent()) {
            tracing::warn!(
                "Published tunnel '{}' does not match its URL {}",
                tunnel.name,
                tunnel.url
            );
        }

        tracing::debug!(
            "Fetched {} tunnel(s): {}",
            published.len(),
            published.names().collect::<Vec<_>>().join(", ")
        );
        Ok(published)
    }

    /// Build the shell command for `name`
    pub fn resolve(&self, published: &PublishedTunnelSet, name: &str) -> Result<String, ClientError> {
        let local = self
            .config
            .tunnels
            .get(name)
            .ok_or_else(|| ClientError::UnknownTunnel(name.to_string()))?;

        let tunnel = published
            .get(name)
            .ok_or_else(|| ClientError::TunnelNotAvailable(name.to_string()))?;

        let template = local
            .command
            .as_deref()
            .ok_or_else(|| ClientError::CommandNotSpecified(name.to_string()))?;

        Ok(render_command(template, name, tunnel))
    }

    /// Fetch once, then resolve and run every requested tunnel in order.
    ///
    /// A command's own exit status is reported in [`Launched`] but is not an
    /// error. Tunnels that could not be resolved or started are collected; a
    /// single failure is returned as is, several as [`ClientError::Failed`].
    pub async fn run(&self, names: &[String]) -> Result<Vec<Launched>, ClientError> {
        let published = self.fetch().await?;

        let mut launched = Vec::with_capacity(names.len());
        let mut failures = Vec::new();

        for name in names {
            let result = match self.resolve(&published, name) {
                Ok(command) => launch(name, &command).await.map(|status| Launched {
                    name: name.clone(),
                    command,
                    status,
                }),
                Err(e) => Err(e),
            };

            match result {
                Ok(done) => launched.push(done),
                Err(e) => {
                    tracing::warn!("{}", e);
                    failures.push(e);
                }
            }
        }

        match failures.len() {
            0 => Ok(launched),
            1 => Err(failures.remove(0)),
            _ => Err(ClientError::Failed { failures }),
        }
    }
}

async fn launch(name: &str, command: &str) -> Result<ExitStatus, ClientError> {
    tracing::info!("Running for '{}': {}", name, command);

    let status = shell(command)
        .status()
        .await
        .map_err(|source| ClientError::Spawn {
            name: name.to_string(),
            source,
        })?;

    if !status.success() {
        tracing::debug!("Command for '{}' exited with {}", name, status);
    }
    Ok(status)
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
