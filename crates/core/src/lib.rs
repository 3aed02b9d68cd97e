//! `shopfront-core`: domain building blocks shared by every resource.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the document envelope, the `Record` contract implemented by each
//! resource type, and the domain error model.

pub mod error;
pub mod id;
pub mod record;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
pub use record::{Document, Record};
pub use value_object::Price;
