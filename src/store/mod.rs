//! Document store abstraction and embedded backends.
//!
//! The agenda treats its persistence as an opaque document store: point
//! writes keyed by store-assigned ids, equality-filtered reads, and a
//! live change feed per collection. [`MemoryStore`] is the ephemeral
//! backend used by tests; [`JsonFileStore`] adds write-through JSON
//! persistence for the embedded CLI profile.

pub mod feed;
mod json_file;
mod memory;
mod traits;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, Subscription};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{Document, DocumentStore, QueryFilter, StoreStats, APPOINTMENTS, PROCESSES};
