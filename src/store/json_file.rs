//! JSON-file document store.
//!
//! [`MemoryStore`] semantics with write-through persistence: the full
//! collection map is loaded on open and rewritten after every mutation.
//! Suited to the embedded CLI profile; a hosted store would implement
//! [`DocumentStore`] against its own wire client instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::feed::Subscription;
use crate::store::memory::MemoryStore;
use crate::store::traits::{Document, DocumentStore, QueryFilter, StoreStats};

/// Document store persisted as a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
    // Serializes snapshot+write pairs so concurrent mutations cannot
    // interleave their file writes.
    persist_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store file, creating parent directories as needed. A
    /// missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        let collections = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(StoreError::Io)?;
            serde_json::from_str::<HashMap<String, HashMap<String, Document>>>(&content)
                .map_err(StoreError::Serialization)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            inner: MemoryStore::with_collections(collections),
            path,
            persist_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.inner.snapshot().await;
        let content = serde_json::to_vec_pretty(&snapshot).map_err(StoreError::Serialization)?;

        // Write to a sibling temp file, then rename over the target so a
        // crash mid-write cannot leave a truncated store.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &content)
            .await
            .map_err(StoreError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::Io)?;

        debug!(path = %self.path.display(), "store persisted");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn add(&self, collection: &str, data: Value) -> Result<Document> {
        let doc = self.inner.add(collection, data).await?;
        self.persist().await?;
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<Document> {
        let doc = self.inner.update(collection, id, data).await?;
        self.persist().await?;
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let removed = self.inner.delete(collection, id).await?;
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn query(&self, collection: &str, filter: QueryFilter) -> Result<Vec<Document>> {
        self.inner.query(collection, filter).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.inner.list(collection).await
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription> {
        self.inner.subscribe(collection).await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.inner.stats().await
    }
}
