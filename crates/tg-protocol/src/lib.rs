//! tg-protocol: Tunnel descriptor model for tunnelgist
//!
//! This crate defines the canonical record describing one live tunnel and
//! the payload the server publishes to the shared gist and the client reads
//! back.

pub mod descriptor;
pub mod error;
pub mod set;

pub use descriptor::{parse_public_url, PublicUrl, TunnelDescriptor};
pub use error::ProtocolError;
pub use set::PublishedTunnelSet;
