//! Category-aware product create/edit form.
//!
//! [`ProductForm`] keeps the attribute schema of the selected category and
//! one value per schema entry. Values are keyed by category-attribute id
//! and kept in schema order, so the exposed value list is always
//! index-aligned with the schema:
//!
//! 1. [`ProductForm::set_category`] loads the new category's schema (cache
//!    first, debounced fetch on a miss) and replaces schema and values in
//!    one step. The last selection wins; superseded loads are dropped.
//! 2. [`ProductForm::enter_edit_mode`] hydrates the form from a stored
//!    product against its category's *current* schema.
//! 3. [`ProductForm::submit`] validates, rebuilds the payload from the
//!    schema, and creates or updates the product.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::RwLock;

use catalog_client::{CatalogApiError, CatalogBackend, ClientConfig};
use catalog_core::models::{
    AttributeValue, CategoryAttribute, Product, ProductDetail, ProductSubmission,
};
use catalog_core::types::DbId;
use catalog_core::validation::{
    is_blank, parse_price, MSG_REQUIRED_ATTRIBUTES, MSG_REQUIRED_FIELDS,
};

use crate::error::FormError;
use crate::schema_cache::{debounce, LoadSlot, Schema, SchemaCache};

/// Whether the form creates a new product or edits a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(DbId),
}

/// Top-level product fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: String,
    pub sku: String,
}

/// Addressable top-level field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Sku,
}

/// How a schema load ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The loaded schema and values are now the form's state.
    Applied,
    /// The category was unselected; schema and values are empty.
    Cleared,
    /// A newer selection took over; this load changed nothing.
    Superseded,
}

/// Point-in-time copy of the form state.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    pub mode: FormMode,
    pub category_id: Option<DbId>,
    pub fields: ProductFields,
    pub schema: Vec<CategoryAttribute>,
    pub values: Vec<AttributeValue>,
}

struct FormState {
    mode: FormMode,
    category_id: Option<DbId>,
    fields: ProductFields,
    schema: Schema,
    /// Keyed by category-attribute id, in schema order.
    values: IndexMap<DbId, String>,
    slot: LoadSlot,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: FormMode::Create,
            category_id: None,
            fields: ProductFields::default(),
            schema: Arc::new(Vec::new()),
            values: IndexMap::new(),
            slot: LoadSlot::default(),
        }
    }
}

impl FormState {
    /// Replace schema and values together, seeding values from `seed`.
    fn apply_schema(&mut self, schema: Schema, seed: Option<&ProductDetail>) {
        self.values = schema
            .iter()
            .map(|binding| {
                let value = seed
                    .and_then(|product| product.value_for(binding.id))
                    .unwrap_or_default()
                    .to_string();
                (binding.id, value)
            })
            .collect();
        self.schema = schema;
    }

    fn clear_schema(&mut self) {
        self.schema = Arc::new(Vec::new());
        self.values.clear();
    }

    fn value_of(&self, category_attribute_id: DbId) -> &str {
        self.values
            .get(&category_attribute_id)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Values in schema order, one per schema entry.
    fn aligned_values(&self) -> Vec<AttributeValue> {
        self.schema
            .iter()
            .map(|binding| AttributeValue::new(binding.id, self.value_of(binding.id)))
            .collect()
    }

    fn validate(&self) -> Result<(), FormError> {
        let f = &self.fields;
        if is_blank(&f.name)
            || is_blank(&f.sku)
            || self.category_id.is_none()
            || is_blank(&f.price)
        {
            return Err(FormError::ValidationFailed(MSG_REQUIRED_FIELDS.to_string()));
        }
        parse_price(&f.price)?;

        if let Some(missing) = self
            .schema
            .iter()
            .find(|binding| binding.is_required && is_blank(self.value_of(binding.id)))
        {
            return Err(FormError::ValidationFailed(format!(
                "{MSG_REQUIRED_ATTRIBUTES} (missing: {})",
                missing.attribute.name
            )));
        }

        for binding in self.schema.iter() {
            binding.attribute.check_value(self.value_of(binding.id))?;
        }
        Ok(())
    }

    fn build_submission(&self) -> Result<ProductSubmission, FormError> {
        let category_id = self
            .category_id
            .ok_or_else(|| FormError::ValidationFailed(MSG_REQUIRED_FIELDS.to_string()))?;
        let price = parse_price(&self.fields.price)?;
        let description = self.fields.description.trim();

        Ok(ProductSubmission {
            category_id,
            name: self.fields.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            price,
            sku: self.fields.sku.trim().to_string(),
            // Derived from the schema, never from accumulated values.
            attribute_values: self.aligned_values(),
        })
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            mode: self.mode,
            category_id: self.category_id,
            fields: self.fields.clone(),
            schema: self.schema.as_ref().clone(),
            values: self.aligned_values(),
        }
    }
}

/// The category-scoped product form controller.
///
/// Safe to share behind an `Arc`; the state lock is never held across a
/// service call.
pub struct ProductForm {
    backend: Arc<dyn CatalogBackend>,
    cache: Arc<SchemaCache>,
    debounce: Duration,
    state: RwLock<FormState>,
}

impl ProductForm {
    /// Create a form in Create mode with a cache of its own.
    ///
    /// * `debounce` - delay before fetching a newly selected category's
    ///   schema; zero disables it.
    pub fn new(backend: Arc<dyn CatalogBackend>, debounce: Duration) -> Self {
        let cache = Arc::new(SchemaCache::new(Arc::clone(&backend)));
        Self::with_cache(backend, cache, debounce)
    }

    /// Create a form that reads schemas through a session-wide cache, so a
    /// refresh made by another view is seen here.
    pub fn with_cache(
        backend: Arc<dyn CatalogBackend>,
        cache: Arc<SchemaCache>,
        debounce: Duration,
    ) -> Self {
        Self {
            backend,
            cache,
            debounce,
            state: RwLock::new(FormState::default()),
        }
    }

    pub fn from_config(
        backend: Arc<dyn CatalogBackend>,
        cache: Arc<SchemaCache>,
        config: &ClientConfig,
    ) -> Self {
        Self::with_cache(backend, cache, config.schema_debounce)
    }

    /// The schema cache this form reads through.
    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    // ---- state transitions ----

    /// Select a category, or unselect with `None`.
    ///
    /// Unselecting clears schema and values. Selecting loads the category's
    /// schema and resets every value to empty. The selection takes effect
    /// when its schema is applied; a fetch failure changes nothing. Fails with
    /// [`FormError::CategoryLocked`] in Edit mode.
    pub async fn set_category(&self, category_id: Option<DbId>) -> Result<LoadOutcome, FormError> {
        let (category_id, generation, cancel) = {
            let mut st = self.state.write().await;
            if let FormMode::Edit(product_id) = st.mode {
                return Err(FormError::CategoryLocked { product_id });
            }
            let Some(category_id) = category_id else {
                st.slot.supersede();
                st.category_id = None;
                st.clear_schema();
                tracing::debug!("Category unselected, schema cleared");
                return Ok(LoadOutcome::Cleared);
            };
            let (generation, cancel) = st.slot.begin();
            (category_id, generation, cancel)
        };

        // Cache hits apply immediately, without debounce or fetch.
        let result = match self.cache.cached(category_id).await {
            Some(schema) => Ok(schema),
            None => {
                if !debounce(self.debounce, &cancel).await {
                    tracing::debug!(
                        category_id,
                        generation,
                        "Schema load superseded during debounce"
                    );
                    return Ok(LoadOutcome::Superseded);
                }
                self.cache.get(category_id, &cancel).await
            }
        };

        self.complete_load(generation, result.map_err(FormError::from), None, |st| {
            st.category_id = Some(category_id);
        })
        .await
    }

    /// Enter Edit mode for a stored product.
    ///
    /// Fetches the product, then its category's current schema, and seeds
    /// each value from the product's stored value for the same binding.
    /// Values for bindings no longer in the schema are dropped; bindings
    /// added since appear empty. On failure the form is left as it was.
    pub async fn enter_edit_mode(&self, product_id: DbId) -> Result<LoadOutcome, FormError> {
        let (generation, cancel) = self.state.write().await.slot.begin();

        let product = tokio::select! {
            _ = cancel.cancelled() => return Ok(LoadOutcome::Superseded),
            result = self.backend.get_product(product_id) => {
                result.map_err(|e| edit_fetch_failed(&e))?
            }
        };
        let schema = self
            .cache
            .get(product.category_id, &cancel)
            .await
            .map_err(FormError::from);

        let seed = product.clone();
        let outcome = self
            .complete_load(generation, schema, Some(&seed), move |st| {
                st.mode = FormMode::Edit(product_id);
                st.category_id = Some(product.category_id);
                st.fields = ProductFields {
                    name: product.name,
                    description: product.description.unwrap_or_default(),
                    price: product.price.to_string(),
                    sku: product.sku,
                };
            })
            .await?;

        if outcome == LoadOutcome::Applied {
            tracing::info!(product_id, category_id = seed.category_id, "Editing product");
        }
        Ok(outcome)
    }

    /// Apply a finished load if it is still current.
    ///
    /// `on_apply` runs under the same lock acquisition as the schema swap.
    async fn complete_load(
        &self,
        generation: u64,
        result: Result<Schema, FormError>,
        seed: Option<&ProductDetail>,
        on_apply: impl FnOnce(&mut FormState),
    ) -> Result<LoadOutcome, FormError> {
        let mut st = self.state.write().await;
        if !st.slot.is_current(generation) {
            tracing::debug!(
                generation,
                current = st.slot.generation(),
                "Dropping stale schema load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        st.slot.finish(generation);

        match result {
            Ok(schema) => {
                tracing::debug!(generation, attributes = schema.len(), "Schema applied");
                on_apply(&mut st);
                st.apply_schema(schema, seed);
                Ok(LoadOutcome::Applied)
            }
            Err(FormError::Cancelled) => Ok(LoadOutcome::Superseded),
            Err(err) => {
                tracing::warn!(generation, error = %err, "Schema load failed");
                Err(err)
            }
        }
    }

    /// Replace the value at `index`, returning the updated value list.
    pub async fn update_value_at(
        &self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<Vec<AttributeValue>, FormError> {
        let mut st = self.state.write().await;
        let len = st.schema.len();
        let id = st
            .schema
            .get(index)
            .map(|binding| binding.id)
            .ok_or(FormError::IndexOutOfRange { index, len })?;
        st.values.insert(id, value.into());
        Ok(st.aligned_values())
    }

    /// Replace the value of a binding in the current schema, by id.
    pub async fn update_value(
        &self,
        category_attribute_id: DbId,
        value: impl Into<String>,
    ) -> Result<Vec<AttributeValue>, FormError> {
        let mut st = self.state.write().await;
        match st.values.get_mut(&category_attribute_id) {
            Some(slot) => *slot = value.into(),
            None => return Err(FormError::UnknownBinding(category_attribute_id)),
        }
        Ok(st.aligned_values())
    }

    pub async fn set_field(&self, field: ProductField, value: impl Into<String>) {
        let mut st = self.state.write().await;
        let value = value.into();
        match field {
            ProductField::Name => st.fields.name = value,
            ProductField::Description => st.fields.description = value,
            ProductField::Price => st.fields.price = value,
            ProductField::Sku => st.fields.sku = value,
        }
    }

    /// Return to an empty Create form. Pending loads are dropped; the
    /// schema cache is kept.
    pub async fn reset(&self) {
        let mut st = self.state.write().await;
        st.slot.supersede();
        st.mode = FormMode::Create;
        st.category_id = None;
        st.fields = ProductFields::default();
        st.clear_schema();
    }

    // ---- validation and submission ----

    /// Check top-level fields, then required attributes, then value types.
    /// Reports the first problem only.
    pub async fn validate(&self) -> Result<(), FormError> {
        self.state.read().await.validate()
    }

    /// Build the create/update payload by zipping schema with values.
    pub async fn build_submission(&self) -> Result<ProductSubmission, FormError> {
        self.state.read().await.build_submission()
    }

    /// Validate and send the form; Create mode creates, Edit mode updates.
    ///
    /// On success the form resets and the saved product is returned. On
    /// rejection the form keeps its state.
    pub async fn submit(&self) -> Result<Product, FormError> {
        let (mode, submission) = {
            let st = self.state.read().await;
            st.validate()?;
            (st.mode, st.build_submission()?)
        };

        let result = match mode {
            FormMode::Create => self.backend.create_product_full(&submission).await,
            FormMode::Edit(product_id) => {
                self.backend.update_product(product_id, &submission).await
            }
        };

        match result {
            Ok(product) => {
                tracing::info!(product_id = product.id, sku = %product.sku, ?mode, "Product saved");
                self.reset().await;
                Ok(product)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?mode, "Product save rejected");
                Err(FormError::SubmitFailed(format!(
                    "Failed to save product: {}",
                    err.detail()
                )))
            }
        }
    }

    // ---- read access ----

    pub async fn snapshot(&self) -> FormSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn mode(&self) -> FormMode {
        self.state.read().await.mode
    }

    pub async fn category_id(&self) -> Option<DbId> {
        self.state.read().await.category_id
    }

    pub async fn schema(&self) -> Schema {
        Arc::clone(&self.state.read().await.schema)
    }

    pub async fn values(&self) -> Vec<AttributeValue> {
        self.state.read().await.aligned_values()
    }
}

fn edit_fetch_failed(err: &CatalogApiError) -> FormError {
    FormError::FetchFailed(format!(
        "Failed to load product attributes for edit: {}",
        err.detail()
    ))
}
