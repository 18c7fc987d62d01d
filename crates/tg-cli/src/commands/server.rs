//! Server command implementation

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::output::{format_tunnels, print_info, print_success, print_warning};
use tg_core::{config, GistStore};
use tg_server::{NgrokApi, Server};

/// Start ngrok, publish its tunnels and supervise it until it exits
pub async fn server_command<F>(config_path: &Path, tunnels: Vec<String>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let settings = config::load_server(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let store = GistStore::new(
        settings.gist.api_url.clone(),
        Some(settings.server.github_token.clone()),
    )?;
    let api = NgrokApi::new(settings.server.tunnels_api_url());

    tokio::pin!(shutdown);

    print_info("Starting ngrok...");
    let Some(running) = Server::new(settings, tunnels, Arc::new(store))
        .launch_until(&api, &mut shutdown)
        .await?
    else {
        print_warning("Interrupted before tunnels were published; ngrok stopped");
        return Ok(());
    };

    print_success(&format!(
        "Published {} tunnel(s) (ngrok pid {})",
        running.published().len(),
        running
            .daemon_pid()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    ));
    println!("{}", format_tunnels(running.published()));
    print_info("Press Ctrl+C to stop");

    let status = running.serve(shutdown).await?;
    if status.success() {
        print_success("ngrok stopped");
    } else {
        print_warning(&format!("ngrok stopped ({})", status));
    }
    Ok(())
}
