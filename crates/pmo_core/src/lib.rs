//! pmo_core: record kinds, timestamp normalization, the document store
//! port, and the record service for the project reporting backend.
//!
//! No sqlx and no HTTP here; `pmo_postgres` and `pmo_server` build on top.

pub mod error;
pub mod memory;
pub mod normalize;
pub mod ports;
pub mod record;
pub mod service;
pub mod types;

pub use error::{PmoError, Result};
pub use ports::{Collection, Document, DocumentStore, Filter};
pub use record::{NewRecord, Record};
pub use service::RecordService;
