//! CLI command implementations

mod client;
mod config;
mod server;

pub use client::client_command;
pub use config::{config_init, config_path, resolve_config_path};
pub use server::server_command;
