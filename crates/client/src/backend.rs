//! The catalog service as seen by the admin UI.

use async_trait::async_trait;

use catalog_core::models::{
    AssignAttribute, Attribute, AttributeInput, Category, CategoryAttribute, CategoryInput,
    Product, ProductDetail, ProductInput, ProductSubmission,
};
use catalog_core::types::DbId;

use crate::api::CatalogApiError;

/// Convenience alias for catalog service call results.
pub type ApiResult<T> = Result<T, CatalogApiError>;

/// Remote catalog operations used by the list views and the product form.
///
/// Implemented over HTTP by [`CatalogApi`](crate::api::CatalogApi). Every
/// method is a single round-trip; callers decide about caching.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Service liveness probe (`GET /`).
    async fn health(&self) -> ApiResult<()>;

    async fn list_categories(&self) -> ApiResult<Vec<Category>>;
    async fn create_category(&self, input: &CategoryInput) -> ApiResult<Category>;
    async fn update_category(&self, id: DbId, input: &CategoryInput) -> ApiResult<Category>;
    async fn delete_category(&self, id: DbId) -> ApiResult<()>;

    async fn list_attributes(&self) -> ApiResult<Vec<Attribute>>;
    async fn create_attribute(&self, input: &AttributeInput) -> ApiResult<Attribute>;
    async fn update_attribute(&self, id: DbId, input: &AttributeInput) -> ApiResult<Attribute>;
    async fn delete_attribute(&self, id: DbId) -> ApiResult<()>;

    /// Ordered attribute bindings of a category: the category's schema.
    async fn list_category_attributes(
        &self,
        category_id: DbId,
    ) -> ApiResult<Vec<CategoryAttribute>>;

    /// Bind an attribute to a category. Binding an attribute twice returns
    /// the existing binding.
    async fn assign_attribute(
        &self,
        category_id: DbId,
        assignment: &AssignAttribute,
    ) -> ApiResult<CategoryAttribute>;

    async fn remove_category_attribute(&self, category_attribute_id: DbId) -> ApiResult<()>;

    async fn list_products(&self) -> ApiResult<Vec<Product>>;

    /// Product with its persisted attribute values.
    async fn get_product(&self, id: DbId) -> ApiResult<ProductDetail>;

    /// Create a product without attribute values.
    async fn create_product(&self, input: &ProductInput) -> ApiResult<Product>;

    /// Create a product together with its attribute values.
    async fn create_product_full(&self, submission: &ProductSubmission) -> ApiResult<Product>;

    /// Replace a product's fields and upsert its attribute values.
    async fn update_product(&self, id: DbId, submission: &ProductSubmission) -> ApiResult<Product>;
}
