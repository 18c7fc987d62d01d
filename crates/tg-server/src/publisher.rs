//! Publishes tunnel sets to the shared gist

use std::sync::Arc;

use tg_core::config::GistConfig;
use tg_core::BlobStore;
use tg_protocol::PublishedTunnelSet;

use crate::error::PublishError;

/// Writes the current tunnel set over the configured gist file
pub struct Publisher {
    store: Arc<dyn BlobStore>,
    gist: GistConfig,
}

impl Publisher {
    pub fn new(store: Arc<dyn BlobStore>, gist: GistConfig) -> Self {
        Self { store, gist }
    }

    /// Overwrite the gist file with `set`
    pub async fn publish(&self, set: &PublishedTunnelSet) -> Result<(), PublishError> {
        let content = set.encode()?;
        self.store
            .set(&self.gist.id, &self.gist.filename, &content)
            .await?;

        tracing::info!(
            "Published {} tunnel(s) to gist {} ({})",
            set.len(),
            self.gist.id,
            self.gist.filename
        );
        Ok(())
    }
}
