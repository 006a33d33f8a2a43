//! Document store port.
//!
//! The record service talks to storage only through [`DocumentStore`], so the
//! same logic runs against Postgres (`pmo_postgres`) or [`MemoryDocumentStore`].
//!
//! [`MemoryDocumentStore`]: crate::memory::MemoryDocumentStore

use async_trait::async_trait;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub use crate::error::Result;

/// A schema-free stored document.
pub type Document = Map<String, Value>;

/// One collection per record kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Projects,
    Milestones,
    Budget,
    Risks,
    Tasks,
    Changes,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Conjunction of exact top-level field matches. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::all().eq("id", id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(k, v)| doc.get(k) == Some(v))
    }

    /// The filter as a JSON object, usable for containment queries.
    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name, reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<()>;

    /// Matching documents in insertion order, at most `limit`.
    async fn find(&self, collection: Collection, filter: &Filter, limit: usize)
        -> Result<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Replace the first match. Returns the matched count (0 or 1).
    async fn replace_one(&self, collection: Collection, filter: &Filter, doc: Document)
        -> Result<u64>;

    /// Delete the first match. Returns the deleted count (0 or 1).
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    async fn ping(&self) -> Result<()>;

    /// Release the underlying connection. Called once at shutdown.
    async fn close(&self) {}
}
