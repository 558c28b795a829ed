//! Blob backend built on the `object_store` crate, which already gives a
//! single byte-exact put/get/delete/list contract over either a local
//! filesystem or an S3-style bucket — exactly the two concrete backends
//! a local filesystem and S3 both need, without this crate reinventing either one.
//!
//! Credential/endpoint wiring for the S3 side is explicitly out of scope
//! Credentials are never handled here: callers construct the `object_store::aws::AmazonS3` themselves
//! and hand it to `ObjectStoreBackend::new`.

use super::BlobBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path as ObjPath;
use object_store::{local::LocalFileSystem, ObjectStore, PutPayload};
use std::sync::Arc;

/// Adapts any `object_store::ObjectStore` into our narrower `BlobBackend`.
pub struct ObjectStoreBackend<S: ObjectStore> {
    store: Arc<S>,
}

impl<S: ObjectStore> ObjectStoreBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store: Arc::new(store) }
    }
}

#[async_trait]
impl<S: ObjectStore> BlobBackend for ObjectStoreBackend<S> {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = ObjPath::from(key);
        self.store
            .put(&path, PutPayload::from(bytes))
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = ObjPath::from(key);
        match self.store.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await.map_err(Error::from)?;
                Ok(Some(bytes.to_vec()))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = ObjPath::from(key);
        match self.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix_path = ObjPath::from(prefix);
        let metas: Vec<_> = self
            .store
            .list(Some(&prefix_path))
            .try_collect()
            .await
            .map_err(Error::from)?;
        Ok(metas.into_iter().map(|m| m.location.to_string()).collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = ObjPath::from(key);
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Error::from(e)),
        }
    }
}

/// Local filesystem backend rooted at a base directory.
pub type LocalFsBackend = ObjectStoreBackend<LocalFileSystem>;

impl LocalFsBackend {
    pub fn at(base_dir: impl AsRef<std::path::Path>) -> Result<Self> {
        let store = LocalFileSystem::new_with_prefix(base_dir).map_err(Error::from)?;
        Ok(Self::new(store))
    }
}

#[cfg(feature = "s3")]
pub type S3Backend = ObjectStoreBackend<object_store::aws::AmazonS3>;
