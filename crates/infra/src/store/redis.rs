//! Redis-backed document store (managed document service).
//!
//! ## Key layout
//!
//! - **Document**: `{prefix}:doc:{id}`, a hash, one field per record field, each
//!   value JSON-encoded
//! - **Index**: `{prefix}:index`, a sorted set of ids scored by creation time
//!   (milliseconds), which gives the listing order
//!
//! Documents live under their own `doc:` segment so no client-supplied id can
//! address the index.
//!
//! Every operation is a single round trip: writes that touch both keys run as
//! an atomic `MULTI` pipeline, and list/update run as server-side Lua scripts.
//! Identifiers have no fixed format here, so unknown strings are simply not
//! found.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RedisError, Script};
use serde_json::{Map, Value as JsonValue};
use tokio::sync::OnceCell;
use tracing::instrument;

use shopfront_core::record::{from_fields, to_fields};
use shopfront_core::{Document, DocumentId, Record};

use super::{DocumentStore, StoreError, StoreResult};

/// Default key namespace for products.
pub const DEFAULT_KEY_PREFIX: &str = "shopfront:products";

/// Returns every indexed document as `[id, field, value, field, value, ...]`.
const LIST_SCRIPT: &str = r#"
local ids = redis.call('ZRANGE', KEYS[1], 0, -1)
local out = {}
for _, id in ipairs(ids) do
  local fields = redis.call('HGETALL', ARGV[1] .. id)
  if #fields > 0 then
    table.insert(fields, 1, id)
    out[#out + 1] = fields
  end
end
return out
"#;

/// Merges field/value pairs into an existing hash; returns nil when absent.
const UPDATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return false
end
if #ARGV > 0 then
  redis.call('HSET', KEYS[1], unpack(ARGV))
end
return redis.call('HGETALL', KEYS[1])
"#;

/// Redis-backed store for one record type.
pub struct RedisDocumentStore<R> {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    key_prefix: String,
    list_script: Script,
    update_script: Script,
    _record: std::marker::PhantomData<fn() -> R>,
}

impl<R> core::fmt::Debug for RedisDocumentStore<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RedisDocumentStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl<R: Record> RedisDocumentStore<R> {
    /// Create a store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL, credentials included
    ///   (e.g., "redis://:secret@localhost:6379")
    /// * `key_prefix` - namespace for this collection's keys
    ///
    /// The connection is opened on first use.
    pub fn new(redis_url: impl AsRef<str>, key_prefix: impl Into<String>) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {e}")))?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            key_prefix: key_prefix.into(),
            list_script: Script::new(LIST_SCRIPT),
            update_script: Script::new(UPDATE_SCRIPT),
            _record: std::marker::PhantomData,
        })
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Round-trip a `PING` (startup connectivity check).
    #[instrument(skip_all, fields(key_prefix = %self.key_prefix), err)]
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn connection(&self) -> StoreResult<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await
            .map_err(map_redis_error)?;
        Ok(conn.clone())
    }

    fn document_key(&self, id: &DocumentId) -> String {
        format!("{}{}", self.document_key_prefix(), id)
    }

    fn index_key(&self) -> String {
        format!("{}:index", self.key_prefix)
    }

    fn document_key_prefix(&self) -> String {
        format!("{}:doc:", self.key_prefix)
    }
}

/// Encode record fields as hash field/value pairs (values JSON-encoded).
fn encode_hash<T: serde::Serialize>(value: &T) -> StoreResult<Vec<(String, String)>> {
    to_fields(value)?
        .into_iter()
        .map(|(field, value)| {
            serde_json::to_string(&value)
                .map(|encoded| (field, encoded))
                .map_err(|e| StoreError::Rejected(e.to_string()))
        })
        .collect()
}

/// Decode hash field/value pairs back into a document.
fn decode_hash<R: Record>(
    id: DocumentId,
    pairs: impl IntoIterator<Item = (String, String)>,
) -> StoreResult<Document<R>> {
    let mut fields = Map::new();
    for (field, raw) in pairs {
        let value: JsonValue = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("document {id} field {field}: {e}")))?;
        fields.insert(field, value);
    }
    let record = from_fields::<R>(fields)
        .map_err(|e| StoreError::Corrupt(format!("document {id}: {e}")))?;
    Ok(Document::new(id, record))
}

/// Split a flat `[field, value, field, value, ...]` reply into pairs.
fn pair_up(flat: Vec<String>) -> StoreResult<Vec<(String, String)>> {
    if flat.len() % 2 != 0 {
        return Err(StoreError::Corrupt("odd number of hash entries".to_string()));
    }
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((field, value));
    }
    Ok(pairs)
}

fn map_redis_error(err: RedisError) -> StoreError {
    match err.kind() {
        ErrorKind::TypeError => StoreError::Corrupt(err.to_string()),
        ErrorKind::ResponseError | ErrorKind::ExtensionError => StoreError::Rejected(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl<R: Record> DocumentStore<R> for RedisDocumentStore<R> {
    fn backend(&self) -> &'static str {
        "redis"
    }

    #[instrument(skip_all, fields(key_prefix = %self.key_prefix), err)]
    async fn list(&self) -> StoreResult<Vec<Document<R>>> {
        let mut conn = self.connection().await?;
        let rows: Vec<Vec<String>> = self
            .list_script
            .key(self.index_key())
            .arg(self.document_key_prefix())
            .invoke_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        rows.into_iter()
            .map(|mut row| {
                if row.is_empty() {
                    return Err(StoreError::Corrupt("empty list row".to_string()));
                }
                let id = DocumentId::new(row.remove(0));
                decode_hash(id, pair_up(row)?)
            })
            .collect()
    }

    #[instrument(skip_all, fields(key_prefix = %self.key_prefix, id = %id), err)]
    async fn get(&self, id: &DocumentId) -> StoreResult<Document<R>> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(self.document_key(id))
            .await
            .map_err(map_redis_error)?;

        if fields.is_empty() {
            return Err(StoreError::NotFound);
        }
        decode_hash(id.clone(), fields)
    }

    #[instrument(skip_all, fields(key_prefix = %self.key_prefix), err)]
    async fn insert(&self, record: R) -> StoreResult<Document<R>> {
        let pairs = encode_hash(&record)?;
        if pairs.is_empty() {
            return Err(StoreError::Rejected("document has no fields".to_string()));
        }

        let id = DocumentId::generate();
        let score = chrono::Utc::now().timestamp_millis();

        let mut conn = self.connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(self.document_key(&id), pairs.as_slice())
            .ignore()
            .zadd(self.index_key(), id.as_str(), score)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        Ok(Document::new(id, record))
    }

    #[instrument(skip_all, fields(key_prefix = %self.key_prefix, id = %id), err)]
    async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<Document<R>> {
        let pairs = encode_hash(&patch)?;

        let mut invocation = self.update_script.key(self.document_key(id));
        for (field, value) in &pairs {
            invocation.arg(field).arg(value);
        }

        let mut conn = self.connection().await?;
        let flat: Option<Vec<String>> = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        let flat = flat.ok_or(StoreError::NotFound)?;
        decode_hash(id.clone(), pair_up(flat)?)
    }

    #[instrument(skip_all, fields(key_prefix = %self.key_prefix, id = %id), err)]
    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let (removed, _unindexed): (i64, i64) = redis::pipe()
            .atomic()
            .del(self.document_key(id))
            .zrem(self.index_key(), id.as_str())
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::Price;
    use shopfront_products::{Product, ProductPatch};

    fn store() -> RedisDocumentStore<Product> {
        RedisDocumentStore::new("redis://localhost:6379", DEFAULT_KEY_PREFIX).unwrap()
    }

    #[test]
    fn keys_are_namespaced_by_prefix() {
        let store = store();
        let id = DocumentId::new("abc123");
        assert_eq!(store.document_key(&id), "shopfront:products:doc:abc123");
        assert_eq!(store.index_key(), "shopfront:products:index");
        assert_eq!(store.document_key_prefix(), "shopfront:products:doc:");
        assert!(!DocumentStore::<Product>::detects_malformed_ids(&store));
    }

    #[test]
    fn no_document_id_addresses_the_index() {
        let store = store();
        let index = store.index_key();
        for raw in ["index", ":index", "../index", "doc:index", ""] {
            let key = store.document_key(&DocumentId::new(raw));
            assert_ne!(key, index, "id {raw:?} collided with the index key");
            assert!(key.starts_with(&store.document_key_prefix()));
        }
    }

    #[test]
    fn invalid_url_is_reported_as_unavailable() {
        let err = RedisDocumentStore::<Product>::new("not a url", DEFAULT_KEY_PREFIX).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn hash_encoding_round_trips_a_product() {
        let mut product = Product::new("Desk Lamp", 25u64);
        product.stock = Some(4);

        let pairs = encode_hash(&product).unwrap();
        assert!(pairs.contains(&("name".to_string(), "\"Desk Lamp\"".to_string())));
        assert!(pairs.contains(&("price".to_string(), "25".to_string())));

        let doc: Document<Product> = decode_hash(DocumentId::new("p1"), pairs).unwrap();
        assert_eq!(doc.id, DocumentId::new("p1"));
        assert_eq!(doc.record, product);
    }

    #[test]
    fn patch_encodes_only_present_fields() {
        let patch = ProductPatch {
            price: Some(Price::from(30u64)),
            ..ProductPatch::default()
        };
        assert_eq!(
            encode_hash(&patch).unwrap(),
            vec![("price".to_string(), "30".to_string())]
        );
        assert!(encode_hash(&ProductPatch::default()).unwrap().is_empty());
    }

    #[test]
    fn undecodable_field_is_corrupt() {
        let pairs = vec![
            ("name".to_string(), "not json".to_string()),
            ("price".to_string(), "1".to_string()),
        ];
        let err = decode_hash::<Product>(DocumentId::new("p1"), pairs).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn pair_up_splits_flat_replies() {
        let flat = vec!["a".to_string(), "1".to_string(), "b".to_string(), "2".to_string()];
        assert_eq!(
            pair_up(flat).unwrap(),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert!(pair_up(vec!["a".to_string()]).is_err());
    }
}
