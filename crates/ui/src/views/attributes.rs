//! Attribute catalog and per-category attribute assignment.
//!
//! The assigned-attribute panel follows the selected category through the
//! same debounced, cached, last-selection-wins load as the product form.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use catalog_client::{CatalogBackend, ClientConfig};
use catalog_core::models::{
    AssignAttribute, Attribute, AttributeInput, Category, CategoryAttribute,
};
use catalog_core::types::DbId;
use catalog_core::validation::validate_attribute_input;

use crate::error::ViewError;
use crate::product_form::LoadOutcome;
use crate::schema_cache::{debounce, FetchError, LoadSlot, Schema, SchemaCache};

const MSG_FETCH_ASSIGNED: &str = "Failed to fetch category attributes";

#[derive(Default)]
struct AttributeState {
    attributes: Vec<Attribute>,
    categories: Vec<Category>,
    selected: Option<DbId>,
    assigned: Schema,
    slot: LoadSlot,
}

/// All attributes, plus the attributes bound to one selected category.
pub struct AttributeListView {
    backend: Arc<dyn CatalogBackend>,
    cache: Arc<SchemaCache>,
    debounce: Duration,
    state: RwLock<AttributeState>,
}

impl AttributeListView {
    /// Create a view with a cache of its own.
    pub fn new(backend: Arc<dyn CatalogBackend>, debounce: Duration) -> Self {
        let cache = Arc::new(SchemaCache::new(Arc::clone(&backend)));
        Self::with_cache(backend, cache, debounce)
    }

    /// Create a view over a session-wide cache. Assign and unassign refresh
    /// the shared entry, so a product form on the same cache sees the new
    /// bindings on its next selection.
    pub fn with_cache(
        backend: Arc<dyn CatalogBackend>,
        cache: Arc<SchemaCache>,
        debounce: Duration,
    ) -> Self {
        Self {
            backend,
            cache,
            debounce,
            state: RwLock::new(AttributeState::default()),
        }
    }

    pub fn from_config(
        backend: Arc<dyn CatalogBackend>,
        cache: Arc<SchemaCache>,
        config: &ClientConfig,
    ) -> Self {
        Self::with_cache(backend, cache, config.schema_debounce)
    }

    /// Load attributes and categories, then select the first category
    /// unless the current selection is still listed.
    pub async fn load(&self) -> Result<LoadOutcome, ViewError> {
        let attributes = self
            .backend
            .list_attributes()
            .await
            .map_err(|e| ViewError::service("Failed to fetch attributes", e))?;
        let categories = self
            .backend
            .list_categories()
            .await
            .map_err(|e| ViewError::service("Failed to fetch categories", e))?;

        let selection = {
            let mut st = self.state.write().await;
            let keep = st
                .selected
                .filter(|id| categories.iter().any(|c| c.id == *id));
            st.attributes = attributes;
            st.categories = categories;
            keep.or_else(|| st.categories.first().map(|c| c.id))
        };
        self.select_category(selection).await
    }

    /// Select the category whose assignments are shown, or none.
    pub async fn select_category(
        &self,
        category_id: Option<DbId>,
    ) -> Result<LoadOutcome, ViewError> {
        let (category_id, generation, cancel) = {
            let mut st = self.state.write().await;
            st.selected = category_id;
            let Some(category_id) = category_id else {
                st.slot.supersede();
                st.assigned = Schema::default();
                return Ok(LoadOutcome::Cleared);
            };
            let (generation, cancel) = st.slot.begin();
            (category_id, generation, cancel)
        };

        let result = match self.cache.cached(category_id).await {
            Some(schema) => Ok(schema),
            None => {
                if !debounce(self.debounce, &cancel).await {
                    return Ok(LoadOutcome::Superseded);
                }
                self.cache.get(category_id, &cancel).await
            }
        };

        let mut st = self.state.write().await;
        if !st.slot.is_current(generation) {
            return Ok(LoadOutcome::Superseded);
        }
        st.slot.finish(generation);
        match result {
            Ok(schema) => {
                st.assigned = schema;
                Ok(LoadOutcome::Applied)
            }
            Err(FetchError::Cancelled) => Ok(LoadOutcome::Superseded),
            Err(FetchError::Failed(err)) => {
                tracing::warn!(category_id, error = %err, "Assigned attributes load failed");
                Err(ViewError::service(MSG_FETCH_ASSIGNED, err))
            }
        }
    }

    /// Create an attribute and reload the attribute list.
    pub async fn create_attribute(&self, input: &AttributeInput) -> Result<Attribute, ViewError> {
        validate_attribute_input(input)?;
        let input = AttributeInput {
            name: input.name.trim().to_string(),
            data_type: input.data_type.trim().to_string(),
            enum_values: input
                .enum_values
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from),
        };
        let attribute = self
            .backend
            .create_attribute(&input)
            .await
            .map_err(|e| ViewError::service("Failed to add attribute", e))?;
        tracing::info!(attribute_id = attribute.id, name = %attribute.name, "Attribute created");

        let attributes = self
            .backend
            .list_attributes()
            .await
            .map_err(|e| ViewError::service("Failed to fetch attributes", e))?;
        self.state.write().await.attributes = attributes;
        Ok(attribute)
    }

    /// Bind an attribute to the selected category.
    pub async fn assign(
        &self,
        attribute_id: DbId,
        is_required: bool,
    ) -> Result<CategoryAttribute, ViewError> {
        let category_id = self.require_selection().await?;
        let binding = self
            .backend
            .assign_attribute(category_id, &AssignAttribute { attribute_id, is_required })
            .await
            .map_err(|e| ViewError::service("Failed to assign attribute to category", e))?;
        tracing::info!(category_id, attribute_id, binding_id = binding.id, "Attribute assigned");
        self.refresh_assigned(category_id).await?;
        Ok(binding)
    }

    /// Remove a binding from the selected category.
    pub async fn unassign(&self, category_attribute_id: DbId) -> Result<(), ViewError> {
        let category_id = self.require_selection().await?;
        self.backend
            .remove_category_attribute(category_attribute_id)
            .await
            .map_err(|e| ViewError::service("Failed to remove attribute from category", e))?;
        tracing::info!(category_id, category_attribute_id, "Attribute unassigned");
        self.refresh_assigned(category_id).await
    }

    async fn require_selection(&self) -> Result<DbId, ViewError> {
        self.state
            .read()
            .await
            .selected
            .ok_or_else(|| ViewError::local("Select a category first"))
    }

    /// Re-fetch a category's bindings after this view changed them.
    async fn refresh_assigned(&self, category_id: DbId) -> Result<(), ViewError> {
        let schema = self.cache.refresh(category_id).await.map_err(|e| match e {
            FetchError::Failed(err) => ViewError::service(MSG_FETCH_ASSIGNED, err),
            FetchError::Cancelled => ViewError::local(MSG_FETCH_ASSIGNED),
        })?;

        let mut st = self.state.write().await;
        if st.selected == Some(category_id) {
            // A pending load for the same category would carry older data.
            st.slot.supersede();
            st.assigned = schema;
        }
        Ok(())
    }

    // ---- read access ----

    pub async fn attributes(&self) -> Vec<Attribute> {
        self.state.read().await.attributes.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    pub async fn selected_category(&self) -> Option<DbId> {
        self.state.read().await.selected
    }

    /// Bindings of the selected category, in binding order.
    pub async fn assigned(&self) -> Schema {
        Arc::clone(&self.state.read().await.assigned)
    }

    /// Attributes not yet bound to the selected category.
    pub async fn unassigned(&self) -> Vec<Attribute> {
        let st = self.state.read().await;
        st.attributes
            .iter()
            .filter(|attr| !st.assigned.iter().any(|b| b.attribute_id == attr.id))
            .cloned()
            .collect()
    }
}
