//! ngrok integration
//!
//! ngrok is treated as a black box: a CLI with `config check` and `start`
//! subcommands, config files in YAML, and a local HTTP control API.

mod api;
mod config;

pub use api::{ApiError, ApiTunnel, ApiTunnelConfig, NgrokApi, TunnelApi, DEFAULT_REQUEST_TIMEOUT};
pub use config::{config_args, load_tunnel_definitions, TunnelDefinitions};
