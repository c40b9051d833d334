use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{
    document_rev, new_document, new_relation_document, patch_document, replace_document,
    revision_matches, Attributes, Collection, Document, DocumentMeta,
};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{require_endpoints, AdminStore, DocumentStore, Store};

/// PostgreSQL-backed document store: one `(key, rev, doc JSONB)` table
/// per collection. Write-write races are detected by compare-and-swap on
/// the `rev` column.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the backing tables for all seven collections.
    pub async fn migrate(&self) -> Result<()> {
        for collection in Collection::ALL {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {} (key TEXT PRIMARY KEY, rev TEXT NOT NULL, doc JSONB NOT NULL)",
                collection.name()
            );
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create table for {}", collection))?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_doc(&self, collection: Collection, key: &str) -> StoreResult<Document> {
        let sql = format!("SELECT doc FROM {} WHERE key = $1", collection.name());
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| other(e, "Failed to fetch document"))?;

        let Some(row) = row else {
            return Err(StoreError::not_found(collection, key));
        };
        document_from_value(row.get("doc"))
    }

    async fn insert_new(
        &self,
        collection: Collection,
        doc: Document,
        meta: DocumentMeta,
    ) -> StoreResult<DocumentMeta> {
        let sql = format!(
            "INSERT INTO {} (key, rev, doc) VALUES ($1, $2, $3)",
            collection.name()
        );
        match sqlx::query(&sql)
            .bind(&meta.key)
            .bind(&meta.rev)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(meta),
            Err(e) if is_unique_violation(&e) => Err(StoreError::conflict(collection, &meta.key)),
            Err(e) => Err(other(e, "Failed to save document")),
        }
    }

    /// CAS write of an already-assembled document. Zero affected rows
    /// means the row vanished or its revision moved under us.
    async fn swap_doc(
        &self,
        collection: Collection,
        key: &str,
        expected_rev: &str,
        doc: Document,
        new_rev: &str,
    ) -> StoreResult<()> {
        let sql = format!(
            "UPDATE {} SET rev = $1, doc = $2 WHERE key = $3 AND rev = $4",
            collection.name()
        );
        let result = sqlx::query(&sql)
            .bind(new_rev)
            .bind(Value::Object(doc))
            .bind(key)
            .bind(expected_rev)
            .execute(&self.pool)
            .await
            .map_err(|e| other(e, "Failed to update document"))?;

        if result.rows_affected() == 0 {
            return Err(match self.fetch_doc(collection, key).await {
                Ok(_) => StoreError::version_conflict(collection, key),
                Err(err) => err,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let sql = format!("SELECT doc FROM {}", collection.name());
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| other(e, "Failed to list collection"))?;

        rows.into_iter()
            .map(|row| document_from_value(row.get("doc")))
            .collect()
    }

    async fn save(&self, collection: Collection, attrs: Attributes) -> StoreResult<DocumentMeta> {
        let (doc, meta) = new_document(collection, attrs);
        self.insert_new(collection, doc, meta).await
    }

    async fn save_relation(
        &self,
        collection: Collection,
        from: Option<&str>,
        to: Option<&str>,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta> {
        let (from, to) = require_endpoints(collection, from, to)?;
        let (doc, meta) = new_relation_document(collection, from, to, attrs);
        self.insert_new(collection, doc, meta).await
    }

    async fn fetch(&self, collection: Collection, key: &str) -> StoreResult<Document> {
        self.fetch_doc(collection, key).await
    }

    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        attrs: Attributes,
    ) -> StoreResult<DocumentMeta> {
        let existing = self.fetch_doc(collection, key).await?;
        let current_rev = document_rev(&existing).unwrap_or_default().to_string();
        if !revision_matches(&attrs, &current_rev) {
            return Err(StoreError::version_conflict(collection, key));
        }
        let (doc, meta) = replace_document(collection, &existing, attrs);
        self.swap_doc(collection, key, &current_rev, doc, &meta.rev)
            .await?;
        Ok(meta)
    }

    async fn patch(
        &self,
        collection: Collection,
        key: &str,
        partial: Attributes,
    ) -> StoreResult<()> {
        let existing = self.fetch_doc(collection, key).await?;
        let current_rev = document_rev(&existing).unwrap_or_default().to_string();
        if !revision_matches(&partial, &current_rev) {
            return Err(StoreError::version_conflict(collection, key));
        }
        let (doc, meta) = patch_document(collection, &existing, partial);
        self.swap_doc(collection, key, &current_rev, doc, &meta.rev)
            .await
    }

    async fn remove(&self, collection: Collection, key: &str) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE key = $1", collection.name());
        let result = sqlx::query(&sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| other(e, "Failed to delete document"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, key));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AdminStore for PostgresStore {
    async fn drop_collection(&self, collection: Collection) -> StoreResult<()> {
        let ddl = format!("DROP TABLE IF EXISTS {}", collection.name());
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| other(e, "Failed to drop collection"))?;
        Ok(())
    }
}

impl Store for PostgresStore {}

fn document_from_value(value: Value) -> StoreResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Other(anyhow!(
            "malformed document row: expected a JSON object"
        ))),
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn other(error: sqlx::Error, what: &str) -> StoreError {
    StoreError::Other(anyhow::Error::new(error).context(what.to_string()))
}
