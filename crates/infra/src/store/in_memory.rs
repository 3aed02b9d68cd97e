use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use shopfront_core::{Document, DocumentId, Record};

use super::{DocumentStore, StoreError, StoreResult};

#[derive(Debug)]
struct Collection<R> {
    next_seq: u64,
    docs: HashMap<DocumentId, (u64, R)>,
}

/// In-memory document store.
///
/// Intended for tests/dev. Identifiers are UUIDv7 in simple hex form; listing
/// returns documents in insertion order.
#[derive(Debug)]
pub struct InMemoryDocumentStore<R> {
    inner: RwLock<Collection<R>>,
}

impl<R> InMemoryDocumentStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collection {
                next_seq: 0,
                docs: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|c| c.docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R> Default for InMemoryDocumentStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl<R: Record> DocumentStore<R> for InMemoryDocumentStore<R> {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> StoreResult<Vec<Document<R>>> {
        let collection = self.inner.read().map_err(|_| poisoned())?;

        let mut entries: Vec<_> = collection.docs.iter().collect();
        entries.sort_by_key(|(_, (seq, _))| *seq);

        Ok(entries
            .into_iter()
            .map(|(id, (_, record))| Document::new(id.clone(), record.clone()))
            .collect())
    }

    async fn get(&self, id: &DocumentId) -> StoreResult<Document<R>> {
        let collection = self.inner.read().map_err(|_| poisoned())?;
        collection
            .docs
            .get(id)
            .map(|(_, record)| Document::new(id.clone(), record.clone()))
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, record: R) -> StoreResult<Document<R>> {
        let mut collection = self.inner.write().map_err(|_| poisoned())?;

        let id = DocumentId::generate();
        let seq = collection.next_seq;
        collection.next_seq += 1;
        collection.docs.insert(id.clone(), (seq, record.clone()));

        Ok(Document::new(id, record))
    }

    async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<Document<R>> {
        let mut collection = self.inner.write().map_err(|_| poisoned())?;
        let (_, record) = collection.docs.get_mut(id).ok_or(StoreError::NotFound)?;

        record.apply_patch(patch);
        Ok(Document::new(id.clone(), record.clone()))
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<()> {
        let mut collection = self.inner.write().map_err(|_| poisoned())?;
        collection
            .docs
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
