//! Category model and DTOs.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A category as returned by `GET /categories/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// DTO for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    /// Build an input, mapping a blank description to `None`.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            name: name.into(),
            description: if description.trim().is_empty() {
                None
            } else {
                Some(description)
            },
        }
    }
}
