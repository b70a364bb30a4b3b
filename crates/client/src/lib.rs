//! Client side of the catalog REST service.
//!
//! [`backend::CatalogBackend`] is the seam the admin UI talks to;
//! [`api::CatalogApi`] implements it over HTTP with [`reqwest`]. With the
//! `memory` feature, [`memory::MemoryCatalog`] implements it in-process.

pub mod api;
pub mod backend;
pub mod config;
#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use api::{CatalogApi, CatalogApiError};
pub use backend::{ApiResult, CatalogBackend};
pub use config::{ClientConfig, ConfigError};
