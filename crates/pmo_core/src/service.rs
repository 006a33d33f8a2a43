//! RecordService: create/list/get/replace/delete over a [`DocumentStore`].
//!
//! Generic over the record kind; the HTTP layer decides which operations each
//! kind exposes.

use std::sync::Arc;

use crate::error::{PmoError, Result};
use crate::normalize::{from_document, to_document};
use crate::ports::{DocumentStore, Filter};
use crate::record::{new_id, NewRecord, Record};

/// Upper bound on documents returned by one list call.
pub const DEFAULT_FETCH_LIMIT: usize = 1000;

pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    fetch_limit: usize,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Validate, assign an id, derive fields, and insert.
    pub async fn create<N: NewRecord>(&self, input: N) -> Result<N::Record> {
        input.validate()?;
        let collection = <N::Record as Record>::COLLECTION;
        let record = input.into_record(new_id());
        let doc = to_document(&record)?;
        self.store.insert_one(collection, doc).await?;
        tracing::debug!(%collection, id = record.id(), "record created");
        Ok(record)
    }

    /// List records in storage order, filtered by owning project when the
    /// kind has one and `project_id` is non-empty.
    pub async fn list<R: Record>(&self, project_id: Option<&str>) -> Result<Vec<R>> {
        let filter = match (R::PARENT_FIELD, project_id) {
            (Some(field), Some(pid)) if !pid.is_empty() => Filter::all().eq(field, pid),
            _ => Filter::all(),
        };
        let docs = self
            .store
            .find(R::COLLECTION, &filter, self.fetch_limit)
            .await?;
        let collection = R::COLLECTION.as_str();
        docs.into_iter()
            .map(|doc| from_document(collection, doc).map_err(PmoError::from))
            .collect()
    }

    pub async fn get<R: Record>(&self, id: &str) -> Result<R> {
        let doc = self
            .store
            .find_one(R::COLLECTION, &Filter::by_id(id))
            .await?
            .ok_or_else(not_found::<R>)?;
        Ok(from_document(R::COLLECTION.as_str(), doc)?)
    }

    /// Replace the whole document at `id` with a record built from `input`.
    pub async fn replace<N: NewRecord>(&self, id: &str, input: N) -> Result<N::Record> {
        input.validate()?;
        let collection = <N::Record as Record>::COLLECTION;
        let record = input.into_record(id.to_string());
        let doc = to_document(&record)?;
        let matched = self
            .store
            .replace_one(collection, &Filter::by_id(id), doc)
            .await?;
        if matched == 0 {
            return Err(not_found::<N::Record>());
        }
        tracing::debug!(%collection, id, "record replaced");
        Ok(record)
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<()> {
        let deleted = self
            .store
            .delete_one(R::COLLECTION, &Filter::by_id(id))
            .await?;
        if deleted == 0 {
            return Err(not_found::<R>());
        }
        let collection = R::COLLECTION;
        tracing::debug!(%collection, id, "record deleted");
        Ok(())
    }
}

fn not_found<R: Record>() -> PmoError {
    PmoError::NotFound(format!("{} not found", R::KIND))
}
