//! In-process blob store

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::BlobStore;
use crate::error::StoreError;

/// Blob store held in memory, with the same update-only semantics as a gist
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create blob `id` with no files
    pub fn create(&self, id: impl Into<String>) {
        self.blobs.entry(id.into()).or_default();
    }

    /// Create blob `id` holding one file
    pub fn with_file(self, id: &str, filename: &str, content: &str) -> Self {
        self.blobs
            .entry(id.to_string())
            .or_default()
            .insert(filename.to_string(), content.to_string());
        self
    }

    /// Make every subsequent `set` fail with a 503
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, id: &str, filename: &str) -> Result<String, StoreError> {
        let blob = self.blobs.get(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;

        blob.get(filename)
            .cloned()
            .ok_or_else(|| StoreError::FileNotFound {
                id: id.to_string(),
                filename: filename.to_string(),
            })
    }

    async fn set(&self, id: &str, filename: &str, content: &str) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                body: "writes rejected".to_string(),
            });
        }

        let mut blob = self.blobs.get_mut(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        blob.insert(filename.to_string(), content.to_string());
        Ok(())
    }
}
