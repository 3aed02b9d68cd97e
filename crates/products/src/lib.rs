//! Products domain module.
//!
//! Products live in the managed document store. This crate contains their shape
//! and boundary validation, implemented purely as domain logic (no IO, no HTTP,
//! no storage).

pub mod product;

pub use product::{Product, ProductPatch};
