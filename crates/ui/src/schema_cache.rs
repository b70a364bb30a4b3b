//! Per-session cache of category attribute schemas.
//!
//! [`SchemaCache`] memoizes `GET /categories/{id}/attributes/` per
//! category for the lifetime of the session. Entries never expire; a
//! fresh session starts with an empty cache.
//!
//! [`LoadSlot`] tracks the single in-flight schema load of one consumer.
//! Each new load bumps a generation and cancels the previous load's
//! token; a completion is applied only while its generation is current.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use catalog_client::{CatalogApiError, CatalogBackend};
use catalog_core::models::CategoryAttribute;
use catalog_core::types::DbId;

use crate::error::FormError;

/// An ordered, shared category schema.
pub type Schema = Arc<Vec<CategoryAttribute>>;

/// Why a schema could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The load was superseded before it completed.
    #[error("schema fetch cancelled")]
    Cancelled,

    #[error(transparent)]
    Failed(#[from] CatalogApiError),
}

impl From<FetchError> for FormError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => FormError::Cancelled,
            FetchError::Failed(e) => FormError::FetchFailed(format!(
                "Failed to load category attributes: {}",
                e.detail()
            )),
        }
    }
}

/// Memoized category schemas backed by a [`CatalogBackend`].
pub struct SchemaCache {
    backend: Arc<dyn CatalogBackend>,
    entries: RwLock<HashMap<DbId, Schema>>,
}

impl SchemaCache {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The cached schema of a category, without touching the network.
    pub async fn cached(&self, category_id: DbId) -> Option<Schema> {
        self.entries.read().await.get(&category_id).cloned()
    }

    /// Return the schema of `category_id`, fetching and storing it on a miss.
    ///
    /// A miss races the fetch against `cancel`; a cancelled fetch returns
    /// [`FetchError::Cancelled`] and stores nothing.
    pub async fn get(
        &self,
        category_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<Schema, FetchError> {
        if let Some(schema) = self.cached(category_id).await {
            tracing::debug!(category_id, "Schema cache hit");
            return Ok(schema);
        }

        tracing::debug!(category_id, "Schema cache miss, fetching");
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.backend.list_category_attributes(category_id) => result?,
        };

        let schema: Schema = Arc::new(fetched);
        self.entries
            .write()
            .await
            .insert(category_id, Arc::clone(&schema));
        Ok(schema)
    }

    /// Re-fetch a category's schema and overwrite its entry.
    ///
    /// Used after this session changed the category's bindings.
    pub async fn refresh(&self, category_id: DbId) -> Result<Schema, FetchError> {
        let schema: Schema = Arc::new(self.backend.list_category_attributes(category_id).await?);
        self.entries
            .write()
            .await
            .insert(category_id, Arc::clone(&schema));
        tracing::debug!(category_id, len = schema.len(), "Schema cache entry refreshed");
        Ok(schema)
    }

    /// Number of cached categories.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Generation bookkeeping for one consumer's in-flight schema load.
#[derive(Debug, Default)]
pub struct LoadSlot {
    generation: u64,
    inflight: Option<CancellationToken>,
}

impl LoadSlot {
    /// Start a new load: cancel the previous one and return the new
    /// generation with its cancellation token.
    pub fn begin(&mut self) -> (u64, CancellationToken) {
        self.supersede();
        let token = CancellationToken::new();
        self.inflight = Some(token.clone());
        (self.generation, token)
    }

    /// Invalidate whatever load is in flight without starting a new one.
    pub fn supersede(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Mark the current load as finished.
    pub fn finish(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.inflight = None;
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Wait out the selection debounce.
///
/// Returns `false` if `cancel` fires first. A zero delay returns `true`
/// immediately unless the token is already cancelled.
pub async fn debounce(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use catalog_client::memory::MemoryCatalog;
    use catalog_core::models::{AssignAttribute, AttributeInput, CategoryInput};

    use super::*;

    async fn catalog_with_binding() -> (Arc<MemoryCatalog>, DbId) {
        let catalog = Arc::new(MemoryCatalog::new());
        let category = catalog
            .create_category(&CategoryInput::new("Shirts", ""))
            .await
            .unwrap();
        let attribute = catalog
            .create_attribute(&AttributeInput {
                name: "Color".into(),
                data_type: "text".into(),
                enum_values: None,
            })
            .await
            .unwrap();
        catalog
            .assign_attribute(
                category.id,
                &AssignAttribute {
                    attribute_id: attribute.id,
                    is_required: false,
                },
            )
            .await
            .unwrap();
        (catalog, category.id)
    }

    #[test]
    fn begin_cancels_previous_token_and_bumps_generation() {
        let mut slot = LoadSlot::default();
        let (first, first_token) = slot.begin();
        let (second, second_token) = slot.begin();

        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
    }

    #[test]
    fn supersede_invalidates_without_new_token() {
        let mut slot = LoadSlot::default();
        let (generation, token) = slot.begin();
        slot.supersede();
        assert!(token.is_cancelled());
        assert!(!slot.is_current(generation));
    }

    #[tokio::test]
    async fn get_stores_entry_on_miss() {
        let (catalog, category_id) = catalog_with_binding().await;
        let cache = SchemaCache::new(catalog);

        assert!(cache.cached(category_id).await.is_none());
        let schema = cache.get(category_id, &CancellationToken::new()).await.unwrap();
        assert_eq!(schema.len(), 1);
        assert!(Arc::ptr_eq(&schema, &cache.cached(category_id).await.unwrap()));
    }

    #[tokio::test]
    async fn cancelled_miss_stores_nothing() {
        let (catalog, category_id) = catalog_with_binding().await;
        let cache = SchemaCache::new(catalog);
        let token = CancellationToken::new();
        token.cancel();

        let result = cache.get(category_id, &token).await;

        assert_matches!(result, Err(FetchError::Cancelled));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn refresh_overwrites_entry() {
        let (catalog, category_id) = catalog_with_binding().await;
        let cache = SchemaCache::new(Arc::clone(&catalog) as Arc<dyn CatalogBackend>);
        let before = cache.get(category_id, &CancellationToken::new()).await.unwrap();

        catalog.remove_category_attribute(before[0].id).await.unwrap();
        let stale = cache.get(category_id, &CancellationToken::new()).await.unwrap();
        assert_eq!(stale.len(), 1);

        let fresh = cache.refresh(category_id).await.unwrap();
        assert!(fresh.is_empty());
        assert!(cache.cached(category_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_debounce_respects_cancelled_token() {
        let token = CancellationToken::new();
        assert!(debounce(Duration::ZERO, &token).await);
        token.cancel();
        assert!(!debounce(Duration::ZERO, &token).await);
        assert!(!debounce(Duration::from_secs(60), &token).await);
    }
}
