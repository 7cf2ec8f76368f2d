//! Document store trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::store::feed::Subscription;

/// Collection holding appointment documents.
pub const APPOINTMENTS: &str = "compromissos";

/// Collection holding case-record documents.
pub const PROCESSES: &str = "processos";

/// A stored document.
///
/// The id and creation timestamp are assigned by the store on `add` and
/// never change afterwards; `update` replaces only `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: String,
    /// Document fields as a JSON object.
    pub data: Value,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Equality filter for document queries.
///
/// Matches documents whose fields equal every listed value, optionally
/// skipping one id (the record being edited, so a self-match never counts).
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    equals: Vec<(String, Value)>,
    exclude_id: Option<String>,
}

impl QueryFilter {
    /// Create an empty filter (matches every document).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a field to equal a value.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Exclude one document id from the match set.
    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Check whether a document matches this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        if self.exclude_id.as_deref() == Some(doc.id.as_str()) {
            return false;
        }
        self.equals
            .iter()
            .all(|(field, value)| doc.data.get(field) == Some(value))
    }
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of appointment documents.
    pub appointments: usize,
    /// Number of process documents.
    pub processes: usize,
}

/// Trait for document store backends.
///
/// Models the external document store the agenda is built on: point
/// writes keyed by store-assigned ids, equality-filtered reads, and a
/// live change feed per collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document; the store assigns the id and creation timestamp.
    async fn add(&self, collection: &str, data: Value) -> Result<Document>;

    /// Get a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Replace a document's data by id. The id and creation timestamp are
    /// preserved.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<Document>;

    /// Delete a document by id. Returns false if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// List documents matching an equality filter.
    async fn query(&self, collection: &str, filter: QueryFilter) -> Result<Vec<Document>>;

    /// List all documents in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// Subscribe to changes in a collection.
    ///
    /// The returned handle delivers one event per mutation until it is
    /// dropped or explicitly unsubscribed.
    async fn subscribe(&self, collection: &str) -> Result<Subscription>;

    /// Get store statistics.
    async fn stats(&self) -> Result<StoreStats>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            data,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_matches_all_fields() {
        let d = doc("a", json!({"dataEvento": "2024-03-10", "horaEvento": "09:00"}));
        let filter = QueryFilter::new()
            .field_eq("dataEvento", "2024-03-10")
            .field_eq("horaEvento", "09:00");
        assert!(filter.matches(&d));

        let filter = QueryFilter::new()
            .field_eq("dataEvento", "2024-03-10")
            .field_eq("horaEvento", "10:00");
        assert!(!filter.matches(&d));
    }

    #[test]
    fn test_filter_excludes_id() {
        let d = doc("a", json!({"dataEvento": "2024-03-10"}));
        let filter = QueryFilter::new()
            .field_eq("dataEvento", "2024-03-10")
            .exclude("a");
        assert!(!filter.matches(&d));

        let filter = QueryFilter::new()
            .field_eq("dataEvento", "2024-03-10")
            .exclude("b");
        assert!(filter.matches(&d));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let d = doc("a", json!({"titulo": "x"}));
        assert!(QueryFilter::new().matches(&d));
    }
}
