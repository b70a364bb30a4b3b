//! Product model, detail view, and submission DTOs.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A product row as returned by `GET /products/` and by mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub sku: String,
}

/// A product's stored value for one category-attribute binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub category_attribute_id: DbId,
    pub value: String,
}

impl AttributeValue {
    pub fn new(category_attribute_id: DbId, value: impl Into<String>) -> Self {
        Self {
            category_attribute_id,
            value: value.into(),
        }
    }
}

/// Full product as returned by `GET /products/{id}`, including its
/// persisted attribute values.
///
/// The service omits the product id from this payload, so callers keep
/// track of the id they asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(default)]
    pub id: Option<DbId>,
    pub category_id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub sku: String,
    #[serde(default)]
    pub attribute_values: Vec<AttributeValue>,
}

impl ProductDetail {
    /// Stored value for a binding, if the product has one.
    pub fn value_for(&self, category_attribute_id: DbId) -> Option<&str> {
        self.attribute_values
            .iter()
            .find(|av| av.category_attribute_id == category_attribute_id)
            .map(|av| av.value.as_str())
    }
}

/// DTO for `POST /products/` (product without attribute values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub category_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub sku: String,
}

/// DTO for `POST /products/full/` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSubmission {
    pub category_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub sku: String,
    pub attribute_values: Vec<AttributeValue>,
}

impl ProductSubmission {
    /// The product fields without attribute values.
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            category_id: self.category_id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            sku: self.sku.clone(),
        }
    }
}
