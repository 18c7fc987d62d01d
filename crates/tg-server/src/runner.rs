//! Server run loop
//!
//! Ties the supervisor and publisher together. A failed publish tears ngrok
//! down before the error is returned, so no daemon is left serving tunnels
//! nobody can discover.

use std::future::Future;
use std::process::ExitStatus;
use std::sync::Arc;

use tg_core::config::ServerSettings;
use tg_core::BlobStore;
use tg_protocol::PublishedTunnelSet;

use crate::error::{ServerError, SupervisorError};
use crate::ngrok::TunnelApi;
use crate::publisher::Publisher;
use crate::supervisor::Supervisor;

/// A configured server that has not started ngrok yet
pub struct Server {
    supervisor: Supervisor,
    publisher: Publisher,
}

impl Server {
    /// `tunnels` overrides `server.tunnels` from the config when non-empty
    pub fn new(settings: ServerSettings, tunnels: Vec<String>, store: Arc<dyn BlobStore>) -> Self {
        let ServerSettings { gist, server } = settings;
        Self {
            supervisor: Supervisor::new(server, tunnels),
            publisher: Publisher::new(store, gist),
        }
    }

    /// Check, start, wait for ngrok and publish its tunnels
    pub async fn launch<A>(mut self, api: &A) -> Result<RunningServer, ServerError>
    where
        A: TunnelApi + ?Sized,
    {
        let published = self.bring_up(api).await?;
        Ok(self.into_running(published))
    }

    /// Like [`Server::launch`], but gives up when `shutdown` completes first.
    ///
    /// An interrupted launch stops ngrok and returns `Ok(None)`.
    pub async fn launch_until<A, F>(
        mut self,
        api: &A,
        shutdown: &mut F,
    ) -> Result<Option<RunningServer>, ServerError>
    where
        A: TunnelApi + ?Sized,
        F: Future<Output = ()> + Unpin,
    {
        let outcome = tokio::select! {
            result = self.bring_up(api) => Some(result),
            _ = shutdown => None,
        };

        match outcome {
            Some(result) => Ok(Some(self.into_running(result?))),
            None => {
                tracing::info!("Interrupted before tunnels were published, stopping ngrok...");
                self.supervisor.shutdown().await;
                Ok(None)
            }
        }
    }

    async fn bring_up<A>(&mut self, api: &A) -> Result<PublishedTunnelSet, ServerError>
    where
        A: TunnelApi + ?Sized,
    {
        self.supervisor.prepare().await?;
        self.supervisor.start()?;

        let published = match self.supervisor.poll_until_ready(api).await {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("ngrok never became ready, stopping it");
                self.supervisor.shutdown().await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.publisher.publish(&published).await {
            tracing::warn!("Publishing failed, stopping ngrok");
            self.supervisor.shutdown().await;
            return Err(e.into());
        }

        Ok(published)
    }

    fn into_running(self, published: PublishedTunnelSet) -> RunningServer {
        RunningServer {
            supervisor: self.supervisor,
            published,
        }
    }
}

/// ngrok is up and its tunnels are published
pub struct RunningServer {
    supervisor: Supervisor,
    published: PublishedTunnelSet,
}

impl RunningServer {
    /// The set written to the gist
    pub fn published(&self) -> &PublishedTunnelSet {
        &self.published
    }

    /// OS process id of ngrok
    pub fn daemon_pid(&self) -> Option<u32> {
        self.supervisor.daemon_pid()
    }

    /// Block until ngrok exits; `shutdown` completing interrupts it first
    pub async fn serve<F>(mut self, shutdown: F) -> Result<ExitStatus, SupervisorError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            status = self.supervisor.wait() => {
                let status = status?;
                tracing::info!("ngrok exited: {}", status);
                return Ok(status);
            }
            _ = shutdown => {
                tracing::info!("Interrupted, stopping ngrok...");
            }
        }

        self.supervisor.terminate();
        self.supervisor.wait().await
    }
}
