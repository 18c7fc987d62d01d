//! Shared blob store
//!
//! The server and clients never talk to each other directly. The only channel
//! between them is one file in one gist, addressed by gist id and filename.

mod gist;
#[cfg(any(test, feature = "test-util"))]
mod memory;

pub use gist::GistStore;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryBlobStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Remote key-value store addressed by id and filename
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the content of `filename` in blob `id`
    async fn get(&self, id: &str, filename: &str) -> Result<String, StoreError>;

    /// Overwrite `filename` in the existing blob `id`
    async fn set(&self, id: &str, filename: &str, content: &str) -> Result<(), StoreError>;
}
