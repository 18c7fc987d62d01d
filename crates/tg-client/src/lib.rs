//! tg-client: Client role for tunnelgist
//!
//! Reads the tunnel set the server published, matches each requested tunnel
//! against the local command templates and runs the resulting commands.

pub mod error;
pub mod launcher;
pub mod template;

pub use error::ClientError;
pub use launcher::{Launched, Launcher};
pub use template::render_command;
