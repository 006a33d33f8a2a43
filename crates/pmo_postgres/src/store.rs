//! Postgres implementation of the `DocumentStore` port.
//!
//! Every collection lives in `pmo.documents`, keyed by `(collection, doc_id)`
//! with the document itself in a JSONB `body`. Filters are evaluated with
//! JSONB containment (`body @> filter`). Storage order is the `seq` column.
//! All SQL is runtime-checked (sqlx::query, not sqlx::query!).

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use pmo_core::ports::{Collection, Document, DocumentStore, Filter, Result};

const SCHEMA_SQL: &str = include_str!("../migrations/001_documents.sql");

/// Postgres-backed document store.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the schema, table and indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn doc_id(doc: &Document) -> Result<String> {
    doc.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("document has no string `id` field").into())
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<()> {
        let id = doc_id(&doc)?;
        sqlx::query(
            r#"
            INSERT INTO pmo.documents (collection, doc_id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Json(Value::Object(doc)))
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM pmo.documents
            WHERE collection = $1
              AND body @> $2
            ORDER BY seq
            LIMIT $3
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_json()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let row = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM pmo.documents
            WHERE collection = $1
              AND body @> $2
            ORDER BY seq
            LIMIT 1
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_json()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn replace_one(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Document,
    ) -> Result<u64> {
        let id = doc_id(&doc)?;
        let result = sqlx::query(
            r#"
            UPDATE pmo.documents
            SET body = $3, doc_id = $4, updated_at = now()
            WHERE seq = (
                SELECT seq
                FROM pmo.documents
                WHERE collection = $1
                  AND body @> $2
                ORDER BY seq
                LIMIT 1
            )
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_json()))
        .bind(Json(Value::Object(doc)))
        .bind(&id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM pmo.documents
            WHERE seq = (
                SELECT seq
                FROM pmo.documents
                WHERE collection = $1
                  AND body @> $2
                ORDER BY seq
                LIMIT 1
            )
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_json()))
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Postgres pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn doc_id_requires_string_id() {
        let Value::Object(doc) = json!({ "id": "abc", "title": "x" }) else {
            unreachable!()
        };
        assert_eq!(doc_id(&doc).unwrap(), "abc");

        let Value::Object(numeric) = json!({ "id": 7 }) else {
            unreachable!()
        };
        assert!(doc_id(&numeric).is_err());
        assert!(doc_id(&Document::new()).is_err());
    }

    #[test]
    fn schema_creates_documents_table() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS pmo.documents"));
        assert!(SCHEMA_SQL.contains("UNIQUE (collection, doc_id)"));
    }
}
