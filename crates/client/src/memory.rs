//! In-process catalog backend.
//!
//! [`MemoryCatalog`] keeps every table in ordered maps and reproduces the
//! service's observable behavior: sequential ids per table, 404 for unknown
//! ids, 409 on duplicate SKUs or category names, 422 on empty attribute
//! values, idempotent attribute assignment, and upsert of attribute values
//! on product update.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use catalog_core::error::CoreError;
use catalog_core::models::{
    AssignAttribute, Attribute, AttributeInput, AttributeValue, Category, CategoryAttribute,
    CategoryInput, Product, ProductDetail, ProductInput, ProductSubmission,
};
use catalog_core::types::DbId;
use catalog_core::validation::{validate_attribute_input, validate_category_name};

use crate::backend::{ApiResult, CatalogBackend};
use crate::CatalogApiError;

/// Thread-safe in-memory catalog.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<DbId, Category>,
    attributes: BTreeMap<DbId, Attribute>,
    bindings: BTreeMap<DbId, Binding>,
    products: BTreeMap<DbId, Product>,
    values: BTreeMap<DbId, StoredValue>,
    sequences: Sequences,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    category_id: DbId,
    attribute_id: DbId,
    is_required: bool,
}

#[derive(Debug, Clone)]
struct StoredValue {
    product_id: DbId,
    category_attribute_id: DbId,
    value: String,
}

#[derive(Debug, Default)]
struct Sequences {
    category: DbId,
    attribute: DbId,
    binding: DbId,
    product: DbId,
    value: DbId,
}

fn next_id(seq: &mut DbId) -> DbId {
    *seq += 1;
    *seq
}

/// Reject empty attribute values the way the service's body validation
/// does: 422 with one error per offending entry.
fn ensure_values_present(values: &[AttributeValue]) -> ApiResult<()> {
    let errors: Vec<serde_json::Value> = values
        .iter()
        .enumerate()
        .filter(|(_, av)| av.value.is_empty())
        .map(|(i, av)| {
            serde_json::json!({
                "type": "string_too_short",
                "loc": ["body", "attribute_values", i, "value"],
                "msg": "String should have at least 1 character",
                "input": av.value,
            })
        })
        .collect();
    if errors.is_empty() {
        return Ok(());
    }
    Err(CatalogApiError::ApiError {
        status: 422,
        body: serde_json::json!({ "detail": errors }).to_string(),
    })
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tables {
    fn binding_view(&self, id: DbId, binding: &Binding) -> ApiResult<CategoryAttribute> {
        let attribute = self
            .attributes
            .get(&binding.attribute_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Attribute",
                id: binding.attribute_id,
            })?;
        Ok(CategoryAttribute {
            id,
            category_id: binding.category_id,
            attribute_id: binding.attribute_id,
            is_required: binding.is_required,
            attribute,
        })
    }

    fn ensure_unique_sku(&self, sku: &str, except: Option<DbId>) -> ApiResult<()> {
        let taken = self
            .products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except);
        if taken {
            return Err(CoreError::Conflict("SKU already exists".into()).into());
        }
        Ok(())
    }

    fn ensure_unique_category_name(&self, name: &str, except: Option<DbId>) -> ApiResult<()> {
        let taken = self
            .categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except);
        if taken {
            return Err(CoreError::Conflict("Category name already exists".into()).into());
        }
        Ok(())
    }

    fn ensure_bindings_exist(&self, values: &[AttributeValue]) -> ApiResult<()> {
        if values
            .iter()
            .any(|v| !self.bindings.contains_key(&v.category_attribute_id))
        {
            return Err(CatalogApiError::ApiError {
                status: 400,
                body: serde_json::json!({ "detail": "Invalid attribute assignment" }).to_string(),
            });
        }
        Ok(())
    }

    fn insert_product(&mut self, input: ProductInput) -> ApiResult<Product> {
        if input.name.trim().is_empty() || input.sku.trim().is_empty() {
            return Err(CoreError::Validation("name and sku must not be empty".into()).into());
        }
        self.ensure_unique_sku(&input.sku, None)?;
        let id = next_id(&mut self.sequences.product);
        let product = Product {
            id,
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            price: input.price,
            sku: input.sku,
        };
        self.products.insert(id, product.clone());
        Ok(product)
    }
}

#[async_trait]
impl CatalogBackend for MemoryCatalog {
    async fn health(&self) -> ApiResult<()> {
        Ok(())
    }

    // ---- categories ----

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.tables().categories.values().cloned().collect())
    }

    async fn create_category(&self, input: &CategoryInput) -> ApiResult<Category> {
        validate_category_name(&input.name)?;
        let mut t = self.tables();
        t.ensure_unique_category_name(&input.name, None)?;
        let id = next_id(&mut t.sequences.category);
        let category = Category {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
        };
        t.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: DbId, input: &CategoryInput) -> ApiResult<Category> {
        validate_category_name(&input.name)?;
        let mut t = self.tables();
        t.ensure_unique_category_name(&input.name, Some(id))?;
        let category = t.categories.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
        category.name = input.name.clone();
        category.description = input.description.clone();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: DbId) -> ApiResult<()> {
        let mut t = self.tables();
        t.categories.remove(&id).ok_or(CoreError::NotFound {
            entity: "Category",
            id,
        })?;
        t.bindings.retain(|_, b| b.category_id != id);
        Ok(())
    }

    // ---- attributes ----

    async fn list_attributes(&self) -> ApiResult<Vec<Attribute>> {
        Ok(self.tables().attributes.values().cloned().collect())
    }

    async fn create_attribute(&self, input: &AttributeInput) -> ApiResult<Attribute> {
        validate_attribute_input(input)?;
        let mut t = self.tables();
        let id = next_id(&mut t.sequences.attribute);
        let attribute = Attribute {
            id,
            name: input.name.clone(),
            data_type: input.data_type.clone(),
            enum_values: input.enum_values.clone(),
        };
        t.attributes.insert(id, attribute.clone());
        Ok(attribute)
    }

    async fn update_attribute(&self, id: DbId, input: &AttributeInput) -> ApiResult<Attribute> {
        validate_attribute_input(input)?;
        let mut t = self.tables();
        let attribute = t.attributes.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Attribute",
            id,
        })?;
        attribute.name = input.name.clone();
        attribute.data_type = input.data_type.clone();
        attribute.enum_values = input.enum_values.clone();
        Ok(attribute.clone())
    }

    async fn delete_attribute(&self, id: DbId) -> ApiResult<()> {
        let mut t = self.tables();
        t.attributes.remove(&id).ok_or(CoreError::NotFound {
            entity: "Attribute",
            id,
        })?;
        t.bindings.retain(|_, b| b.attribute_id != id);
        Ok(())
    }

    // ---- category attributes ----

    async fn list_category_attributes(
        &self,
        category_id: DbId,
    ) -> ApiResult<Vec<CategoryAttribute>> {
        let t = self.tables();
        t.bindings
            .iter()
            .filter(|(_, b)| b.category_id == category_id)
            .map(|(id, b)| t.binding_view(*id, b))
            .collect()
    }

    async fn assign_attribute(
        &self,
        category_id: DbId,
        assignment: &AssignAttribute,
    ) -> ApiResult<CategoryAttribute> {
        let mut t = self.tables();
        if !t.categories.contains_key(&category_id) {
            return Err(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }
            .into());
        }
        let existing = t
            .bindings
            .iter()
            .find(|(_, b)| {
                b.category_id == category_id && b.attribute_id == assignment.attribute_id
            })
            .map(|(id, b)| (*id, *b));
        if let Some((id, binding)) = existing {
            return t.binding_view(id, &binding);
        }
        let binding = Binding {
            category_id,
            attribute_id: assignment.attribute_id,
            is_required: assignment.is_required,
        };
        // Resolve the attribute before allocating an id.
        t.binding_view(0, &binding)?;
        let id = next_id(&mut t.sequences.binding);
        t.bindings.insert(id, binding);
        t.binding_view(id, &binding)
    }

    async fn remove_category_attribute(&self, category_attribute_id: DbId) -> ApiResult<()> {
        let mut t = self.tables();
        t.bindings
            .remove(&category_attribute_id)
            .ok_or(CoreError::NotFound {
                entity: "CategoryAttribute",
                id: category_attribute_id,
            })?;
        Ok(())
    }

    // ---- products ----

    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.tables().products.values().cloned().collect())
    }

    async fn get_product(&self, id: DbId) -> ApiResult<ProductDetail> {
        let t = self.tables();
        let product = t.products.get(&id).ok_or(CoreError::NotFound {
            entity: "Product",
            id,
        })?;
        let attribute_values = t
            .values
            .values()
            .filter(|v| v.product_id == id)
            .map(|v| AttributeValue::new(v.category_attribute_id, v.value.clone()))
            .collect();
        Ok(ProductDetail {
            id: None,
            category_id: product.category_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            sku: product.sku.clone(),
            attribute_values,
        })
    }

    async fn create_product(&self, input: &ProductInput) -> ApiResult<Product> {
        self.tables().insert_product(input.clone())
    }

    async fn create_product_full(&self, submission: &ProductSubmission) -> ApiResult<Product> {
        ensure_values_present(&submission.attribute_values)?;
        let mut t = self.tables();
        t.ensure_bindings_exist(&submission.attribute_values)?;
        let product = t.insert_product(submission.to_input())?;
        for av in &submission.attribute_values {
            let id = next_id(&mut t.sequences.value);
            t.values.insert(
                id,
                StoredValue {
                    product_id: product.id,
                    category_attribute_id: av.category_attribute_id,
                    value: av.value.clone(),
                },
            );
        }
        Ok(product)
    }

    async fn update_product(&self, id: DbId, submission: &ProductSubmission) -> ApiResult<Product> {
        ensure_values_present(&submission.attribute_values)?;
        let mut guard = self.tables();
        let t = &mut *guard;
        if !t.products.contains_key(&id) {
            return Err(CoreError::NotFound {
                entity: "Product",
                id,
            }
            .into());
        }
        t.ensure_unique_sku(&submission.sku, Some(id))?;
        t.ensure_bindings_exist(&submission.attribute_values)?;

        for av in &submission.attribute_values {
            let existing = t
                .values
                .values_mut()
                .find(|v| {
                    v.product_id == id && v.category_attribute_id == av.category_attribute_id
                });
            match existing {
                Some(stored) => stored.value.clone_from(&av.value),
                None => {
                    let value_id = next_id(&mut t.sequences.value);
                    t.values.insert(
                        value_id,
                        StoredValue {
                            product_id: id,
                            category_attribute_id: av.category_attribute_id,
                            value: av.value.clone(),
                        },
                    );
                }
            }
        }

        let product = t.products.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Product",
            id,
        })?;
        product.category_id = submission.category_id;
        product.name = submission.name.clone();
        product.description = submission.description.clone();
        product.price = submission.price;
        product.sku = submission.sku.clone();
        Ok(product.clone())
    }
}
