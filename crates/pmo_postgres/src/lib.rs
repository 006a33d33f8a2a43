//! pmo_postgres: PostgreSQL adapter for the project reporting document store.

pub mod store;

pub use store::PgDocumentStore;
