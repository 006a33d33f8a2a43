//! In-process document store. Used by tests and `PMO_STORE=memory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{Collection, Document, DocumentStore, Filter, Result};

/// Documents kept per collection in insertion order.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryDocumentStore {
    pub(crate) async fn len(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(doc);
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn replace_one(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Document,
    ) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)));
        match slot {
            Some(existing) => {
                *existing = doc;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_and_limit() {
        let store = MemoryDocumentStore::new();
        for i in 0..5 {
            store
                .insert_one(Collection::Tasks, doc(json!({ "id": i.to_string(), "pos": i })))
                .await
                .unwrap();
        }
        let all = store.find(Collection::Tasks, &Filter::all(), 1000).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4"]);

        let capped = store.find(Collection::Tasks, &Filter::all(), 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Risks, doc(json!({ "id": "r1" })))
            .await
            .unwrap();
        assert_eq!(store.len(Collection::Risks).await, 1);
        assert_eq!(store.len(Collection::Tasks).await, 0);
        assert!(store
            .find_one(Collection::Tasks, &Filter::by_id("r1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn replace_and_delete_report_counts() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Projects, doc(json!({ "id": "p1", "title": "old" })))
            .await
            .unwrap();

        let matched = store
            .replace_one(
                Collection::Projects,
                &Filter::by_id("p1"),
                doc(json!({ "id": "p1", "title": "new" })),
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);
        let got = store
            .find_one(Collection::Projects, &Filter::by_id("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got["title"], json!("new"));

        let missing = store
            .replace_one(Collection::Projects, &Filter::by_id("nope"), Document::new())
            .await
            .unwrap();
        assert_eq!(missing, 0);

        assert_eq!(
            store
                .delete_one(Collection::Projects, &Filter::by_id("p1"))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .delete_one(Collection::Projects, &Filter::by_id("p1"))
                .await
                .unwrap(),
            0
        );
    }
}
