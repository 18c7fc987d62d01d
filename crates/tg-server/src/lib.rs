//! tg-server: Server role for tunnelgist
//!
//! Starts ngrok with the requested tunnels, waits until its control API
//! reports all of them, publishes their descriptors to the shared gist and
//! then supervises the ngrok process until it exits or is interrupted.

pub mod error;
pub mod ngrok;
pub mod publisher;
pub mod runner;
pub mod supervisor;

pub use error::{PublishError, ServerError, SupervisorError};
pub use ngrok::{ApiError, ApiTunnel, NgrokApi, TunnelApi};
pub use publisher::Publisher;
pub use runner::{RunningServer, Server};
pub use supervisor::{wait_for_tunnels, Phase, Supervisor};
