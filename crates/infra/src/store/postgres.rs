//! Postgres-backed document store.
//!
//! Each collection is one table holding a JSONB document per row:
//!
//! ```sql
//! CREATE TABLE items (
//!     id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     doc        JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! Identifiers are assigned by the database. Because they are UUIDs, a string
//! that does not parse as one is reported as [`StoreError::MalformedId`]
//! before any query is issued. Updates merge server-side with `doc || patch`.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use shopfront_core::record::{from_fields, to_fields};
use shopfront_core::{Document, DocumentId, Record};

use super::{DocumentStore, StoreError, StoreResult};

/// Postgres-backed store for one record type.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool which is cheap to clone and safe to share.
/// The pool connects lazily, so constructing the store never blocks on the
/// database.
pub struct PostgresDocumentStore<R> {
    pool: PgPool,
    table: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresDocumentStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> core::fmt::Debug for PostgresDocumentStore<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresDocumentStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<R: Record> PostgresDocumentStore<R> {
    /// Create a store over `table`.
    ///
    /// The table name is interpolated into SQL, so it must be a plain
    /// lowercase identifier.
    pub fn new(pool: PgPool, table: impl Into<String>) -> StoreResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            pool,
            table,
            _record: PhantomData,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the collection table if it does not exist yet.
    #[instrument(skip_all, fields(table = %self.table), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                doc        JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            table = self.table
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at, id)",
            table = self.table
        );
        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

fn validate_table_name(table: &str) -> StoreResult<()> {
    let mut chars = table.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid && table.len() <= 48 {
        Ok(())
    } else {
        Err(StoreError::Rejected(format!("invalid table name: {table:?}")))
    }
}

fn parse_id(id: &DocumentId) -> StoreResult<Uuid> {
    Ok(id.parse_uuid()?)
}

/// Decode one `(id, doc)` row into a document.
fn decode_document<R: Record>(id: Uuid, doc: JsonValue) -> StoreResult<Document<R>> {
    let fields = match doc {
        JsonValue::Object(map) => map,
        other => {
            return Err(StoreError::Corrupt(format!(
                "document {id} is not a JSON object: {other}"
            )));
        }
    };
    let record = from_fields::<R>(fields)
        .map_err(|e| StoreError::Corrupt(format!("document {id}: {e}")))?;
    Ok(Document::new(DocumentId::from(id), record))
}

fn decode_row<R: Record>(row: &PgRow) -> StoreResult<Document<R>> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let Json(doc): Json<JsonValue> = row
        .try_get("doc")
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    decode_document(id, doc)
}

fn encode_fields<T: serde::Serialize>(value: &T) -> StoreResult<Json<JsonValue>> {
    let fields: Map<String, JsonValue> = to_fields(value)?;
    Ok(Json(JsonValue::Object(fields)))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            // SQLSTATE class 22 (data exception) and 23 (integrity violation)
            // mean the store refused the data; anything else is a server fault.
            match db_err.code() {
                Some(code) if code.starts_with("22") || code.starts_with("23") => {
                    StoreError::Rejected(msg)
                }
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode error in {operation}: {err}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

#[async_trait]
impl<R: Record> DocumentStore<R> for PostgresDocumentStore<R> {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn detects_malformed_ids(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(table = %self.table), err)]
    async fn list(&self) -> StoreResult<Vec<Document<R>>> {
        let sql = format!(
            "SELECT id, doc FROM {} ORDER BY created_at ASC, id ASC",
            self.table
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode_row::<R>).collect()
    }

    #[instrument(skip_all, fields(table = %self.table, id = %id), err)]
    async fn get(&self, id: &DocumentId) -> StoreResult<Document<R>> {
        let uuid = parse_id(id)?;
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", self.table);
        let row = sqlx::query(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?
            .ok_or(StoreError::NotFound)?;

        decode_row(&row)
    }

    #[instrument(skip_all, fields(table = %self.table), err)]
    async fn insert(&self, record: R) -> StoreResult<Document<R>> {
        let doc = encode_fields(&record)?;
        let sql = format!(
            "INSERT INTO {} (doc) VALUES ($1) RETURNING id, doc",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(doc)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        decode_row(&row)
    }

    #[instrument(skip_all, fields(table = %self.table, id = %id), err)]
    async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<Document<R>> {
        let uuid = parse_id(id)?;
        let changes = encode_fields(&patch)?;
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING id, doc",
            self.table
        );
        let row = sqlx::query(&sql)
            .bind(uuid)
            .bind(changes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?
            .ok_or(StoreError::NotFound)?;

        decode_row(&row)
    }

    #[instrument(skip_all, fields(table = %self.table, id = %id), err)]
    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        let uuid = parse_id(id)?;
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql)
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shopfront_core::Price;
    use shopfront_inventory::{Item, ItemPatch};

    fn lazy_store() -> PostgresDocumentStore<Item> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/shopfront_test")
            .unwrap();
        PostgresDocumentStore::new(pool, "items").unwrap()
    }

    #[test]
    fn table_names_are_restricted_to_plain_identifiers() {
        assert!(validate_table_name("items").is_ok());
        assert!(validate_table_name("items_v2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("Items").is_err());
        assert!(validate_table_name("items; DROP TABLE items").is_err());
        assert!(validate_table_name("2items").is_err());
    }

    #[test]
    fn decodes_row_payload_into_document() {
        let id = Uuid::now_v7();
        let doc: Document<Item> =
            decode_document(id, json!({ "name": "Widget", "price": 10 })).unwrap();
        assert_eq!(doc.id, DocumentId::from(id));
        assert_eq!(doc.record, Item::new("Widget", 10u64));
    }

    #[test]
    fn non_object_payload_is_corrupt() {
        let err = decode_document::<Item>(Uuid::now_v7(), json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn payload_missing_required_fields_is_corrupt() {
        let err = decode_document::<Item>(Uuid::now_v7(), json!({ "name": "Widget" })).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn patch_encodes_only_present_fields() {
        let patch = ItemPatch {
            price: Some(Price::from(12u64)),
            ..ItemPatch::default()
        };
        let Json(value) = encode_fields(&patch).unwrap();
        assert_eq!(value, json!({ "price": 12 }));
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_querying() {
        let store = lazy_store();
        assert!(DocumentStore::<Item>::detects_malformed_ids(&store));

        let id = DocumentId::new("not-a-uuid");
        assert!(matches!(store.get(&id).await, Err(StoreError::MalformedId(_))));
        assert!(matches!(
            store.update(&id, ItemPatch::default()).await,
            Err(StoreError::MalformedId(_))
        ));
        assert!(matches!(store.delete(&id).await, Err(StoreError::MalformedId(_))));
    }
}
