//! Attribute and category-attribute binding models.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// A named, typed field usable across categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: DbId,
    pub name: String,
    pub data_type: String,
    /// Comma-separated allowed values; only meaningful for `enum` attributes.
    #[serde(default)]
    pub enum_values: Option<String>,
}

/// The value shape an attribute's `data_type` denotes.
///
/// Unknown data types are treated as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Int,
    Enum,
}

impl AttributeKind {
    pub fn parse(data_type: &str) -> Self {
        match data_type.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => AttributeKind::Int,
            "enum" => AttributeKind::Enum,
            _ => AttributeKind::Text,
        }
    }
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        AttributeKind::parse(&self.data_type)
    }

    /// Allowed values of an enum attribute, trimmed, blanks skipped.
    pub fn enum_options(&self) -> Vec<&str> {
        split_enum_values(self.enum_values.as_deref().unwrap_or(""))
    }

    /// Check a non-empty value against the attribute's data type.
    ///
    /// Empty values are accepted here; whether a value may be empty is
    /// decided by the binding's `is_required` flag.
    pub fn check_value(&self, value: &str) -> Result<(), CoreError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        match self.kind() {
            AttributeKind::Text => Ok(()),
            AttributeKind::Int => value.parse::<i64>().map(|_| ()).map_err(|_| {
                CoreError::Validation(format!(
                    "{} must be a whole number, got '{value}'",
                    self.name
                ))
            }),
            AttributeKind::Enum => {
                let options = self.enum_options();
                if options.contains(&value) {
                    Ok(())
                } else {
                    Err(CoreError::Validation(format!(
                        "{} must be one of: {}",
                        self.name,
                        options.join(", ")
                    )))
                }
            }
        }
    }
}

/// Split a comma-separated enum value list.
pub fn split_enum_values(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// DTO for creating or updating an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInput {
    pub name: String,
    pub data_type: String,
    pub enum_values: Option<String>,
}

// ---------------------------------------------------------------------------
// CategoryAttribute
// ---------------------------------------------------------------------------

/// Binding of an attribute to a category with a required/optional flag.
///
/// The service embeds the bound [`Attribute`] in every binding it returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAttribute {
    pub id: DbId,
    pub category_id: DbId,
    pub attribute_id: DbId,
    #[serde(default)]
    pub is_required: bool,
    pub attribute: Attribute,
}

/// DTO for `POST /categories/{id}/attributes/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignAttribute {
    pub attribute_id: DbId,
    #[serde(default)]
    pub is_required: bool,
}
