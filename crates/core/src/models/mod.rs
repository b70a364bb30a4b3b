//! Entity structs and request DTOs exchanged with the catalog service.

pub mod attribute;
pub mod category;
pub mod product;

pub use attribute::{AssignAttribute, Attribute, AttributeInput, AttributeKind, CategoryAttribute};
pub use category::{Category, CategoryInput};
pub use product::{AttributeValue, Product, ProductDetail, ProductInput, ProductSubmission};
