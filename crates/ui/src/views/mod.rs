//! List views behind the category, attribute and product admin screens.
//!
//! Each view owns the rows it displays and reports failures as a single
//! [`ViewError`](crate::error::ViewError) message.

pub mod attributes;
pub mod categories;
pub mod products;

pub use attributes::AttributeListView;
pub use categories::{CategoryDraft, CategoryListView};
pub use products::{format_price, ProductListView, ProductRow};
