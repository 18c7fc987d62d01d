//! Client command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::output::print_error;
use tg_client::{ClientError, Launcher};
use tg_core::{config, GistStore};

/// Resolve and run the command for every requested tunnel
pub async fn client_command(config_path: &Path, tunnels: &[String]) -> Result<()> {
    let settings = config::load_client(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let store = GistStore::new(
        settings.gist.api_url.clone(),
        settings.client.github_token.clone(),
    )?;
    let launcher = Launcher::new(settings, Arc::new(store));

    match launcher.run(tunnels).await {
        Ok(_) => Ok(()),
        Err(ClientError::Failed { failures }) => {
            for failure in &failures {
                print_error(&failure.to_string());
            }
            anyhow::bail!("{} of {} tunnel(s) failed", failures.len(), tunnels.len())
        }
        Err(e) => Err(e.into()),
    }
}
