//! Store-assigned document identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Identifier of a stored document.
///
/// Identifiers are assigned by the backing store at creation time and are
/// opaque to the gateway: they are forwarded verbatim. Stores that key their
/// documents by UUID can use [`DocumentId::parse_uuid`] to detect malformed
/// identifiers before issuing a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier (UUIDv7, simple hex form).
    ///
    /// Only stores call this; the gateway never generates identifiers.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Interpret the identifier as a UUID (hyphenated or simple form).
    pub fn parse_uuid(&self) -> DomainResult<Uuid> {
        Uuid::from_str(&self.0).map_err(|e| DomainError::invalid_id(format!("{}: {}", self.0, e)))
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for DocumentId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_parse_as_uuids() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(a.parse_uuid().is_ok());
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn uuid_round_trips_through_display() {
        let uuid = Uuid::now_v7();
        let id = DocumentId::from(uuid);
        assert_eq!(id.parse_uuid().unwrap(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn malformed_id_is_rejected_as_invalid_id() {
        let err = DocumentId::new("not-a-uuid").parse_uuid().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("not-a-uuid")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
