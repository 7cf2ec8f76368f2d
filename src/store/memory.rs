//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::feed::{ChangeFeed, ChangeKind, Subscription};
use crate::store::traits::{
    Document, DocumentStore, QueryFilter, StoreStats, APPOINTMENTS, PROCESSES,
};

/// Internal data: collection name -> document id -> document.
type Collections = HashMap<String, HashMap<String, Document>>;

/// Ephemeral document store backed by a HashMap.
///
/// Used by tests and the `memory` backend profile; the JSON-file backend
/// layers persistence over the same semantics.
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<Collections>,
    feed: ChangeFeed,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            feed: ChangeFeed::default(),
        }
    }

    /// Create a store pre-populated with collections (used by the JSON
    /// backend when loading from disk).
    pub(crate) fn with_collections(collections: Collections) -> Self {
        Self {
            data: RwLock::new(collections),
            feed: ChangeFeed::default(),
        }
    }

    /// Snapshot all collections (used by the JSON backend to persist).
    pub(crate) async fn snapshot(&self) -> Collections {
        self.data.read().await.clone()
    }

    fn require_object(data: &Value) -> Result<()> {
        if data.is_object() {
            Ok(())
        } else {
            Err(StoreError::InvalidDocument("document data must be a JSON object".to_string()).into())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, data: Value) -> Result<Document> {
        Self::require_object(&data)?;
        let doc = Document {
            id: uuid::Uuid::new_v4().to_string(),
            data,
            created_at: Utc::now(),
        };

        let mut collections = self.data.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        drop(collections);

        debug!(collection, id = %doc.id, "document added");
        self.feed.publish(collection, ChangeKind::Added, doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.data.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<Document> {
        Self::require_object(&data)?;
        let mut collections = self.data.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.data = data;
        let doc = doc.clone();
        drop(collections);

        debug!(collection, id, "document updated");
        self.feed
            .publish(collection, ChangeKind::Updated, doc.clone());
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.data.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        drop(collections);

        match removed {
            Some(doc) => {
                debug!(collection, id, "document deleted");
                self.feed.publish(collection, ChangeKind::Deleted, doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query(&self, collection: &str, filter: QueryFilter) -> Result<Vec<Document>> {
        let collections = self.data.read().await;
        let mut matches: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.query(collection, QueryFilter::new()).await
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription> {
        Ok(self.feed.subscribe(collection))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let collections = self.data.read().await;
        Ok(StoreStats {
            appointments: collections.get(APPOINTMENTS).map_or(0, HashMap::len),
            processes: collections.get(PROCESSES).map_or(0, HashMap::len),
        })
    }
}
