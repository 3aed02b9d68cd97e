//! Infrastructure layer: backing stores for documents.

pub mod store;

pub use store::{
    DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, RedisDocumentStore, StoreError,
    StoreResult,
};
