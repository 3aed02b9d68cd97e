//! Document store boundary.
//!
//! This module defines the single seam between the gateway and a backing
//! store. Each operation maps to exactly one round trip against the store; no
//! retries, no caching.

pub mod in_memory;
pub mod postgres;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use shopfront_core::{Document, DocumentId, DomainError, Record};

pub use self::in_memory::InMemoryDocumentStore;
pub use self::postgres::PostgresDocumentStore;
pub use self::redis::RedisDocumentStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// These are **infrastructure errors**. The HTTP layer folds them into three
/// outward classes: client error (`MalformedId`), not found (`NotFound`) and
/// server error (everything else).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document has the requested identifier.
    #[error("document not found")]
    NotFound,

    /// The identifier cannot name any document in this store.
    ///
    /// Only stores with a fixed identifier format can detect this; see
    /// [`DocumentStore::detects_malformed_ids`].
    #[error("malformed identifier: {0}")]
    MalformedId(String),

    /// The store refused the write (constraint or data error).
    #[error("store rejected the operation: {0}")]
    Rejected(String),

    /// The store could not be reached or the driver failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded.
    #[error("stored document is corrupt: {0}")]
    Corrupt(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => StoreError::Rejected(msg),
            DomainError::InvalidId(msg) => StoreError::MalformedId(msg),
            DomainError::NotFound => StoreError::NotFound,
        }
    }
}

/// A collection of documents of one record type.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - assign the identifier on `insert` (callers never supply one)
/// - keep identifiers immutable across `update`
/// - merge on `update`: only fields present in the patch change
/// - list in the store's native order (creation order for every adapter here)
/// - report unknown identifiers as [`StoreError::NotFound`]
#[async_trait]
pub trait DocumentStore<R: Record>: Send + Sync {
    /// Short backend name for logs ("memory", "postgres", "redis").
    fn backend(&self) -> &'static str;

    /// Whether this store reports [`StoreError::MalformedId`].
    ///
    /// Stores without a fixed identifier format treat every string as a
    /// possible identifier and answer `NotFound` instead.
    fn detects_malformed_ids(&self) -> bool {
        false
    }

    async fn list(&self) -> StoreResult<Vec<Document<R>>>;

    async fn get(&self, id: &DocumentId) -> StoreResult<Document<R>>;

    async fn insert(&self, record: R) -> StoreResult<Document<R>>;

    async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<Document<R>>;

    async fn delete(&self, id: &DocumentId) -> StoreResult<()>;
}

#[async_trait]
impl<R, S> DocumentStore<R> for Arc<S>
where
    R: Record,
    S: DocumentStore<R> + ?Sized,
{
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn detects_malformed_ids(&self) -> bool {
        (**self).detects_malformed_ids()
    }

    async fn list(&self) -> StoreResult<Vec<Document<R>>> {
        (**self).list().await
    }

    async fn get(&self, id: &DocumentId) -> StoreResult<Document<R>> {
        (**self).get(id).await
    }

    async fn insert(&self, record: R) -> StoreResult<Document<R>> {
        (**self).insert(record).await
    }

    async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<Document<R>> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        (**self).delete(id).await
    }
}
