//! The record contract and the document envelope.
//!
//! A *record* is the typed field set of one resource (an item, a product)
//! without its identifier. A [`Document`] pairs a record with the identifier
//! the store assigned to it.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;

/// A resource type the gateway can store and serve.
///
/// ## Update semantics
///
/// Updates are partial merges: every field present in [`Record::Patch`]
/// replaces the stored value, absent fields are kept. Each patch field is
/// validated on its own by [`Record::validate_patch`]. Field constraints are
/// independent of each other, so applying a valid patch to a valid record
/// always yields a valid record. Stores rely on this to merge server-side.
pub trait Record:
    Clone + core::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Partial form accepted by updates. Absent fields must be skipped when
    /// serialized so the serialized patch only carries the changed fields.
    type Patch: Clone + core::fmt::Debug + Default + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Singular, lowercase resource name used in messages and logs.
    const KIND: &'static str;

    /// Validate a full record (create payloads).
    fn validate(&self) -> DomainResult<()>;

    /// Validate the fields present in a patch (update payloads).
    fn validate_patch(patch: &Self::Patch) -> DomainResult<()>;

    /// Merge a patch into this record.
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// A stored record together with its store-assigned identifier.
///
/// Serializes as a flat JSON object: the record's fields plus `"id"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<R> {
    pub id: DocumentId,
    #[serde(flatten)]
    pub record: R,
}

impl<R> Document<R> {
    pub fn new(id: DocumentId, record: R) -> Self {
        Self { id, record }
    }
}

/// Serialize a record or patch into its top-level JSON fields.
pub fn to_fields<T: Serialize>(value: &T) -> DomainResult<Map<String, JsonValue>> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::validation(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(DomainError::validation(e.to_string())),
    }
}

/// Rebuild a record from its top-level JSON fields.
pub fn from_fields<R: DeserializeOwned>(fields: Map<String, JsonValue>) -> DomainResult<R> {
    serde_json::from_value(JsonValue::Object(fields)).map_err(|e| DomainError::validation(e.to_string()))
}
