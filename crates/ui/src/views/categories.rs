use std::sync::Arc;

use catalog_client::CatalogBackend;
use catalog_core::models::{Category, CategoryInput};
use catalog_core::types::DbId;
use catalog_core::validation::validate_category_name;

use crate::error::ViewError;

/// Editable copy of one category's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub id: DbId,
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    fn to_input(&self) -> CategoryInput {
        CategoryInput::new(self.name.trim(), self.description.as_str())
    }
}

/// Category list with inline create, edit and delete.
pub struct CategoryListView {
    backend: Arc<dyn CatalogBackend>,
    categories: Vec<Category>,
    editing: Option<CategoryDraft>,
}

impl CategoryListView {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            categories: Vec::new(),
            editing: None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Reload the list from the service.
    pub async fn load(&mut self) -> Result<&[Category], ViewError> {
        self.categories = self
            .backend
            .list_categories()
            .await
            .map_err(|e| ViewError::service("Failed to fetch categories", e))?;
        tracing::debug!(count = self.categories.len(), "Categories loaded");
        Ok(&self.categories)
    }

    /// Create a category and reload the list.
    ///
    /// A blank name is rejected before any call is made.
    pub async fn create(&mut self, name: &str, description: &str) -> Result<Category, ViewError> {
        validate_category_name(name)?;
        let category = self
            .backend
            .create_category(&CategoryInput::new(name.trim(), description))
            .await
            .map_err(|e| ViewError::service("Failed to create category", e))?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        self.load().await?;
        Ok(category)
    }

    /// Open a listed category for editing, replacing any open draft.
    pub fn start_edit(&mut self, id: DbId) -> Result<&mut CategoryDraft, ViewError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ViewError::local(format!("Category {id} is not listed")))?;
        Ok(self.editing.insert(CategoryDraft {
            id,
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }))
    }

    pub fn editing(&self) -> Option<&CategoryDraft> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut CategoryDraft> {
        self.editing.as_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the open draft, close it, and reload the list.
    ///
    /// On failure the draft stays open.
    pub async fn save_edit(&mut self) -> Result<Category, ViewError> {
        let draft = self
            .editing
            .as_ref()
            .ok_or_else(|| ViewError::local("No category is being edited"))?;
        validate_category_name(&draft.name)?;

        let category = self
            .backend
            .update_category(draft.id, &draft.to_input())
            .await
            .map_err(|e| ViewError::service("Failed to update category", e))?;
        tracing::info!(category_id = category.id, "Category updated");
        self.cancel_edit();
        self.load().await?;
        Ok(category)
    }

    /// Delete a category and reload the list.
    pub async fn delete(&mut self, id: DbId) -> Result<(), ViewError> {
        self.backend
            .delete_category(id)
            .await
            .map_err(|e| ViewError::service("Failed to delete category", e))?;
        tracing::info!(category_id = id, "Category deleted");
        if self.editing.as_ref().is_some_and(|d| d.id == id) {
            self.cancel_edit();
        }
        self.load().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use catalog_client::memory::MemoryCatalog;
    use catalog_core::validation::MSG_EMPTY_CATEGORY_NAME;

    use super::*;

    fn view() -> CategoryListView {
        CategoryListView::new(Arc::new(MemoryCatalog::new()))
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let mut view = view();
        let err = view.create("   ", "anything").await.unwrap_err();
        assert_eq!(err.message, MSG_EMPTY_CATEGORY_NAME);
        assert!(err.source.is_none());
        assert!(view.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_edit_and_delete_reload_the_list() {
        let mut view = view();
        let shirts = view.create(" Shirts ", "").await.unwrap();
        assert_eq!(shirts.name, "Shirts");
        assert_eq!(shirts.description, None);
        assert_eq!(view.categories().len(), 1);

        let draft = view.start_edit(shirts.id).unwrap();
        draft.name = "Tops".into();
        draft.description = "Upper body".into();
        let updated = view.save_edit().await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Upper body"));
        assert!(view.editing().is_none());
        assert_eq!(view.categories()[0].name, "Tops");

        view.delete(shirts.id).await.unwrap();
        assert!(view.categories().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_keeps_draft_open() {
        let mut view = view();
        view.create("Shirts", "").await.unwrap();
        let shoes = view.create("Shoes", "").await.unwrap();

        view.start_edit(shoes.id).unwrap().name = "Shirts".into();
        let err = view.save_edit().await.unwrap_err();

        assert_eq!(err.message, "Failed to update category");
        assert_eq!(err.source.as_ref().and_then(|e| e.status()), Some(409));
        assert_eq!(view.editing().map(|d| d.name.as_str()), Some("Shirts"));
    }

    #[tokio::test]
    async fn deleting_unknown_category_reports_failure() {
        let mut view = view();
        let err = view.delete(42).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete category");
    }

    #[test]
    fn start_edit_requires_listed_category() {
        let mut view = view();
        assert!(view.start_edit(7).is_err());
        assert!(view.editing_mut().is_none());
    }
}
