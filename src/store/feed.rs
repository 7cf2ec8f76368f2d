//! Live change feed for store collections.
//!
//! Replaces opaque listener callbacks with an explicit channel: a
//! [`Subscription`] is a token whose drop (or `unsubscribe`) releases the
//! listener deterministically when the consumer goes away.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::store::traits::Document;

/// Kind of store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Updated,
    Deleted,
}

/// A single store mutation, as delivered to subscribers.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Collection the mutation happened in.
    pub collection: String,
    /// Kind of mutation.
    pub kind: ChangeKind,
    /// Snapshot of the document after the mutation (before it, for
    /// deletions).
    pub document: Document,
}

/// Fan-out side of the change feed, owned by the store.
#[derive(Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a mutation. A feed with no subscribers drops the event.
    pub fn publish(&self, collection: &str, kind: ChangeKind, document: Document) {
        let _ = self.sender.send(ChangeEvent {
            collection: collection.to_string(),
            kind,
            document,
        });
    }

    /// Register a subscriber for one collection.
    pub fn subscribe(&self, collection: &str) -> Subscription {
        Subscription {
            collection: collection.to_string(),
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Receiving side of the change feed, scoped to one collection.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Collection this subscription follows.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Wait for the next change in the subscribed collection.
    ///
    /// Returns `None` once the store side of the feed is gone. A slow
    /// subscriber that falls behind the buffer skips the lost events and
    /// keeps receiving.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.collection == self.collection => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        collection = %self.collection,
                        skipped,
                        "change feed subscriber lagged"
                    );
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Stop listening. Dropping the subscription has the same effect;
    /// this form makes the teardown explicit at the call site.
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            data: json!({"titulo": "x"}),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_matching_collection_only() {
        let feed = ChangeFeed::default();
        let mut sub = feed.subscribe("compromissos");

        feed.publish("processos", ChangeKind::Added, doc("p1"));
        feed.publish("compromissos", ChangeKind::Added, doc("c1"));

        let event = sub.next().await.unwrap();
        assert_eq!(event.document.id, "c1");
        assert_eq!(event.kind, ChangeKind::Added);
    }

    #[tokio::test]
    async fn test_feed_closes_when_store_side_drops() {
        let feed = ChangeFeed::default();
        let mut sub = feed.subscribe("compromissos");
        drop(feed);
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_listener() {
        let feed = ChangeFeed::default();
        let sub = feed.subscribe("compromissos");
        assert_eq!(feed.sender.receiver_count(), 1);
        sub.unsubscribe();
        assert_eq!(feed.sender.receiver_count(), 0);
    }
}
