//! In-memory blob backend.
//!
//! This is the reference implementation of `BlobBackend`, modeled on a
//! plain `RwLock`-guarded map rather than the graph layer above it. Used
//! for unit tests and for embedding the engine without any real I/O.

use super::BlobBackend;
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryBlobBackend {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.write().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.blobs.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .blobs
            .read()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
