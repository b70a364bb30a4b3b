//! Domain types shared by the catalog admin crates.
//!
//! Holds the entity and DTO structs exchanged with the catalog service,
//! the [`error::CoreError`] type, and the field-level validation helpers
//! used by the admin forms.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;
