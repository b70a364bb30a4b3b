//! Shared fixtures for the catalog UI integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use catalog_client::memory::MemoryCatalog;
use catalog_client::{ApiResult, CatalogApiError, CatalogBackend};
use catalog_core::models::{
    AssignAttribute, Attribute, AttributeInput, Category, CategoryAttribute, CategoryInput,
    Product, ProductDetail, ProductInput, ProductSubmission,
};
use catalog_core::types::DbId;

/// [`MemoryCatalog`] wrapper that counts schema fetches per category and
/// can hold a category's schema fetch open until released.
#[derive(Default)]
pub struct GatedCatalog {
    pub inner: MemoryCatalog,
    fetches: Mutex<HashMap<DbId, usize>>,
    gates: Mutex<HashMap<DbId, Arc<Semaphore>>>,
    failing: Mutex<HashSet<DbId>>,
    started: Notify,
}

impl GatedCatalog {
    /// Block schema fetches for `category_id` until [`release`](Self::release).
    pub fn hold(&self, category_id: DbId) {
        self.gates
            .lock()
            .unwrap()
            .insert(category_id, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, category_id: DbId) {
        if let Some(gate) = self.gates.lock().unwrap().remove(&category_id) {
            gate.add_permits(64);
        }
    }

    /// Make schema fetches for `category_id` fail with a 500.
    pub fn fail_schema(&self, category_id: DbId) {
        self.failing.lock().unwrap().insert(category_id);
    }

    pub fn schema_fetches(&self, category_id: DbId) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&category_id)
            .copied()
            .unwrap_or(0)
    }

    /// Wait until a schema fetch for `category_id` has started.
    pub async fn wait_for_fetch(&self, category_id: DbId) {
        loop {
            let notified = self.started.notified();
            if self.schema_fetches(category_id) > 0 {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl CatalogBackend for GatedCatalog {
    async fn health(&self) -> ApiResult<()> {
        self.inner.health().await
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.inner.list_categories().await
    }

    async fn create_category(&self, input: &CategoryInput) -> ApiResult<Category> {
        self.inner.create_category(input).await
    }

    async fn update_category(&self, id: DbId, input: &CategoryInput) -> ApiResult<Category> {
        self.inner.update_category(id, input).await
    }

    async fn delete_category(&self, id: DbId) -> ApiResult<()> {
        self.inner.delete_category(id).await
    }

    async fn list_attributes(&self) -> ApiResult<Vec<Attribute>> {
        self.inner.list_attributes().await
    }

    async fn create_attribute(&self, input: &AttributeInput) -> ApiResult<Attribute> {
        self.inner.create_attribute(input).await
    }

    async fn update_attribute(&self, id: DbId, input: &AttributeInput) -> ApiResult<Attribute> {
        self.inner.update_attribute(id, input).await
    }

    async fn delete_attribute(&self, id: DbId) -> ApiResult<()> {
        self.inner.delete_attribute(id).await
    }

    async fn list_category_attributes(
        &self,
        category_id: DbId,
    ) -> ApiResult<Vec<CategoryAttribute>> {
        *self.fetches.lock().unwrap().entry(category_id).or_default() += 1;
        self.started.notify_waiters();

        let gate = self.gates.lock().unwrap().get(&category_id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.failing.lock().unwrap().contains(&category_id) {
            return Err(CatalogApiError::ApiError {
                status: 500,
                body: r#"{"detail":"boom"}"#.to_string(),
            });
        }
        self.inner.list_category_attributes(category_id).await
    }

    async fn assign_attribute(
        &self,
        category_id: DbId,
        assignment: &AssignAttribute,
    ) -> ApiResult<CategoryAttribute> {
        self.inner.assign_attribute(category_id, assignment).await
    }

    async fn remove_category_attribute(&self, category_attribute_id: DbId) -> ApiResult<()> {
        self.inner.remove_category_attribute(category_attribute_id).await
    }

    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.inner.list_products().await
    }

    async fn get_product(&self, id: DbId) -> ApiResult<ProductDetail> {
        self.inner.get_product(id).await
    }

    async fn create_product(&self, input: &ProductInput) -> ApiResult<Product> {
        self.inner.create_product(input).await
    }

    async fn create_product_full(&self, submission: &ProductSubmission) -> ApiResult<Product> {
        self.inner.create_product_full(submission).await
    }

    async fn update_product(&self, id: DbId, submission: &ProductSubmission) -> ApiResult<Product> {
        self.inner.update_product(id, submission).await
    }
}

/// Seeded catalog: "Shirts" binds Color (required text) and Size
/// (optional enum); "Shoes" binds EU Size (required int).
pub struct Fixture {
    pub catalog: Arc<GatedCatalog>,
    pub shirts: DbId,
    pub shoes: DbId,
    pub color: CategoryAttribute,
    pub size: CategoryAttribute,
    pub eu_size: CategoryAttribute,
}

impl Fixture {
    pub fn backend(&self) -> Arc<dyn CatalogBackend> {
        Arc::clone(&self.catalog) as Arc<dyn CatalogBackend>
    }
}

pub async fn fixture() -> Fixture {
    let catalog = Arc::new(GatedCatalog::default());
    let shirts = category(&catalog, "Shirts").await;
    let shoes = category(&catalog, "Shoes").await;

    let color = attribute(&catalog, "Color", "text", None).await;
    let size = attribute(&catalog, "Size", "enum", Some("S,M,L")).await;
    let eu_size = attribute(&catalog, "EU Size", "int", None).await;

    let color = bind(&catalog, shirts, color, true).await;
    let size = bind(&catalog, shirts, size, false).await;
    let eu_size = bind(&catalog, shoes, eu_size, true).await;

    Fixture {
        catalog,
        shirts,
        shoes,
        color,
        size,
        eu_size,
    }
}

pub async fn category(catalog: &GatedCatalog, name: &str) -> DbId {
    catalog
        .inner
        .create_category(&CategoryInput::new(name, ""))
        .await
        .unwrap()
        .id
}

pub async fn attribute(
    catalog: &GatedCatalog,
    name: &str,
    data_type: &str,
    enum_values: Option<&str>,
) -> DbId {
    catalog
        .inner
        .create_attribute(&AttributeInput {
            name: name.into(),
            data_type: data_type.into(),
            enum_values: enum_values.map(String::from),
        })
        .await
        .unwrap()
        .id
}

pub async fn bind(
    catalog: &GatedCatalog,
    category_id: DbId,
    attribute_id: DbId,
    is_required: bool,
) -> CategoryAttribute {
    catalog
        .inner
        .assign_attribute(
            category_id,
            &AssignAttribute {
                attribute_id,
                is_required,
            },
        )
        .await
        .unwrap()
}
