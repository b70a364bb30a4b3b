use std::collections::HashMap;
use std::sync::Arc;

use catalog_client::CatalogBackend;
use catalog_core::models::{Category, Product};
use catalog_core::types::DbId;

use crate::error::ViewError;

/// Shown for a product whose category is not listed.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One display row of the product table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: DbId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: String,
}

/// Render a price with two decimals.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Product table with category names resolved.
pub struct ProductListView {
    backend: Arc<dyn CatalogBackend>,
    products: Vec<Product>,
    categories: HashMap<DbId, Category>,
}

impl ProductListView {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            products: Vec::new(),
            categories: HashMap::new(),
        }
    }

    /// Reload products, then categories.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        self.products = self
            .backend
            .list_products()
            .await
            .map_err(|e| ViewError::service("Failed to load products", e))?;
        self.categories = self
            .backend
            .list_categories()
            .await
            .map_err(|e| ViewError::service("Failed to load categories", e))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        tracing::debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            "Product list loaded"
        );
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn category_name(&self, product: &Product) -> &str {
        self.categories
            .get(&product.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn rows(&self) -> Vec<ProductRow> {
        self.products
            .iter()
            .map(|p| ProductRow {
                id: p.id,
                name: p.name.clone(),
                sku: p.sku.clone(),
                category: self.category_name(p).to_string(),
                price: format_price(p.price),
            })
            .collect()
    }
}
