//! # Blob Backend
//!
//! The engine depends only on this narrow capability: put/get/delete/list
//! of opaque byte blobs under a hierarchical, `/`-separated key space.
//! Neither implementation validates or caches anything — both preserve
//! byte fidelity and nothing more.

pub mod memory;
pub mod object_store_backend;

pub use memory::MemoryBlobBackend;
pub use object_store_backend::{LocalFsBackend, ObjectStoreBackend};
#[cfg(feature = "s3")]
pub use object_store_backend::S3Backend;

use crate::error::Result;
use async_trait::async_trait;

/// The universal storage contract the engine is built on.
#[async_trait]
pub trait BlobBackend: Send + Sync + 'static {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// `None` if the key doesn't exist — absence is a normal result, not
    /// an error (mirrors `getNode`'s "does not fail if missing").
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// All keys under `prefix`. Backends are free to stream internally;
    /// callers see a materialized list.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
