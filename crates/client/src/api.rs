//! REST API client for the catalog service HTTP endpoints.
//!
//! Wraps the category, attribute, category-attribute and product
//! endpoints using [`reqwest`]. Every request carries a fresh
//! `x-request-id` header so service logs can be correlated with ours.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use catalog_core::error::CoreError;
use catalog_core::models::{
    AssignAttribute, Attribute, AttributeInput, Category, CategoryAttribute, CategoryInput,
    Product, ProductDetail, ProductInput, ProductSubmission,
};
use catalog_core::types::DbId;

use crate::backend::{ApiResult, CatalogBackend};
use crate::config::ClientConfig;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for a single catalog service.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the catalog REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Catalog API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl CatalogApiError {
    /// HTTP status of a rejected request, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogApiError::Request(err) => err.status().map(|s| s.as_u16()),
            CatalogApiError::ApiError { status, .. } => Some(*status),
        }
    }

    /// Operator-facing detail.
    ///
    /// The service reports errors as `{"detail": ...}`; a string detail is
    /// returned as-is, a structured one (field validation errors) as compact
    /// JSON. Bodies that are not JSON are returned raw.
    pub fn detail(&self) -> String {
        match self {
            CatalogApiError::Request(err) => err.to_string(),
            CatalogApiError::ApiError { body, .. } => {
                match serde_json::from_str::<serde_json::Value>(body) {
                    Ok(serde_json::Value::Object(map)) => match map.get("detail") {
                        Some(serde_json::Value::String(detail)) => detail.clone(),
                        Some(other) => other.to_string(),
                        None => body.clone(),
                    },
                    _ => body.clone(),
                }
            }
        }
    }
}

impl From<CoreError> for CatalogApiError {
    fn from(err: CoreError) -> Self {
        CatalogApiError::ApiError {
            status: err.status(),
            body: serde_json::json!({ "detail": err.detail() }).to_string(),
        }
    }
}

impl CatalogApi {
    /// Create a new API client from configuration.
    ///
    /// The request timeout from `config` applies to every call.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8000`.
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base HTTP URL of the service.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// Start a request with a fresh correlation id.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(%method, path, request_id = %request_id, "Catalog API request");
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .header(REQUEST_ID_HEADER, request_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::parse_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.request(method, path).json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check_status(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`CatalogApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Catalog API rejected request");
            return Err(CatalogApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> ApiResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for CatalogApi {
    async fn health(&self) -> ApiResult<()> {
        let response = self.request(Method::GET, "/").send().await?;
        Self::check_status(response).await
    }

    // ---- categories ----

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json("/categories/").await
    }

    async fn create_category(&self, input: &CategoryInput) -> ApiResult<Category> {
        self.send_json(Method::POST, "/categories/", input).await
    }

    async fn update_category(&self, id: DbId, input: &CategoryInput) -> ApiResult<Category> {
        self.send_json(Method::PUT, &format!("/categories/{id}"), input)
            .await
    }

    async fn delete_category(&self, id: DbId) -> ApiResult<()> {
        self.delete(&format!("/categories/{id}")).await
    }

    // ---- attributes ----

    async fn list_attributes(&self) -> ApiResult<Vec<Attribute>> {
        self.get_json("/attributes/").await
    }

    async fn create_attribute(&self, input: &AttributeInput) -> ApiResult<Attribute> {
        self.send_json(Method::POST, "/attributes/", input).await
    }

    async fn update_attribute(&self, id: DbId, input: &AttributeInput) -> ApiResult<Attribute> {
        self.send_json(Method::PUT, &format!("/attributes/{id}"), input)
            .await
    }

    async fn delete_attribute(&self, id: DbId) -> ApiResult<()> {
        self.delete(&format!("/attributes/{id}")).await
    }

    // ---- category attributes ----

    async fn list_category_attributes(
        &self,
        category_id: DbId,
    ) -> ApiResult<Vec<CategoryAttribute>> {
        self.get_json(&format!("/categories/{category_id}/attributes/"))
            .await
    }

    async fn assign_attribute(
        &self,
        category_id: DbId,
        assignment: &AssignAttribute,
    ) -> ApiResult<CategoryAttribute> {
        self.send_json(
            Method::POST,
            &format!("/categories/{category_id}/attributes/"),
            assignment,
        )
        .await
    }

    async fn remove_category_attribute(&self, category_attribute_id: DbId) -> ApiResult<()> {
        self.delete(&format!("/category-attributes/{category_attribute_id}/"))
            .await
    }

    // ---- products ----

    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.get_json("/products/").await
    }

    async fn get_product(&self, id: DbId) -> ApiResult<ProductDetail> {
        self.get_json(&format!("/products/{id}")).await
    }

    async fn create_product(&self, input: &ProductInput) -> ApiResult<Product> {
        self.send_json(Method::POST, "/products/", input).await
    }

    async fn create_product_full(&self, submission: &ProductSubmission) -> ApiResult<Product> {
        self.send_json(Method::POST, "/products/full/", submission)
            .await
    }

    async fn update_product(&self, id: DbId, submission: &ProductSubmission) -> ApiResult<Product> {
        self.send_json(Method::PUT, &format!("/products/{id}"), submission)
            .await
    }
}
