//! Record traits binding each kind to its collection.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::{PmoError, Result};
use crate::ports::Collection;

/// A stored record kind.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Human-readable kind, used in NotFound messages.
    const KIND: &'static str;

    /// Field referencing the owning project. `None` for root records.
    const PARENT_FIELD: Option<&'static str> = Some("project_id");

    fn id(&self) -> &str;
}

/// A create (or replace) payload for a record kind.
pub trait NewRecord: Send {
    type Record: Record;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Build the record to store under `id`, with server defaults and derived
    /// fields applied.
    fn into_record(self, id: String) -> Self::Record;
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PmoError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )))
    }
}

pub(crate) fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PmoError::Validation(format!("{field} must be a finite number")))
    }
}
