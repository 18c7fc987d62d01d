//! tunnelgist CLI
//!
//! Single binary for both sides of a tunnel:
//! - Server (starts ngrok and publishes its tunnels to a gist)
//! - Client (reads the gist and runs a command per tunnel)
//! - Config management

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunnelgist::commands;

#[derive(Parser)]
#[command(name = "tunnelgist")]
#[command(author, version, about = "Publish ngrok tunnels to a GitHub gist and connect to them")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "TUNNELGIST_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start ngrok and publish its tunnels
    Server {
        /// Tunnels to start (defaults to server.tunnels in config)
        tunnels: Vec<String>,
    },

    /// Run the configured command for published tunnels
    Client {
        /// Tunnel names to connect to
        #[arg(required = true)]
        tunnels: Vec<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = commands::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Server { tunnels } => {
            commands::server_command(&config_path, tunnels, shutdown_signal()).await?;
        }

        Commands::Client { tunnels } => {
            commands::client_command(&config_path, &tunnels).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                commands::config_init(cli.config.as_deref(), force)?;
            }
            ConfigAction::Path => {
                commands::config_path(cli.config.as_deref());
            }
        },
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping ngrok...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, stopping ngrok...");
        }
    }
}
