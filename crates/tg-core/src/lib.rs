//! tg-core: Configuration and shared abstractions for tunnelgist
//!
//! This crate provides the configuration resolver used by both roles and
//! the blob store seam through which the server publishes tunnel sets and
//! clients read them back.

pub mod config;
pub mod error;
pub mod store;

pub use error::{ConfigError, StoreError};
pub use store::{BlobStore, GistStore};
#[cfg(any(test, feature = "test-util"))]
pub use store::MemoryBlobStore;
