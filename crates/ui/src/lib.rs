//! Headless admin UI state for the catalog.
//!
//! The centerpiece is [`product_form::ProductForm`], the category-aware
//! product create/edit controller. The list views in [`views`] drive the
//! category, attribute and product screens. One session builds a single
//! `Arc<`[`schema_cache::SchemaCache`]`>` and hands it to both the form and
//! the attribute view through their `with_cache` constructors, so bindings
//! changed in the attribute view reach the form.

pub mod error;
pub mod product_form;
pub mod schema_cache;
pub mod views;

pub use error::{FormError, ViewError};
pub use product_form::{
    FormMode, FormSnapshot, LoadOutcome, ProductField, ProductFields, ProductForm,
};
pub use schema_cache::{Schema, SchemaCache};
pub use views::{AttributeListView, CategoryListView, ProductListView};
