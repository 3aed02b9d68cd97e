//! Inventory domain module.
//!
//! Items live in the document database. This crate only holds their shape and
//! boundary validation (no IO, no HTTP, no storage).

pub mod item;

pub use item::{Item, ItemPatch};
