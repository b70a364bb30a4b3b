//! Field validation helpers for the admin forms.
//!
//! Each helper returns [`CoreError::Validation`] carrying the message the
//! admin surfaces verbatim to the operator.

use crate::error::CoreError;
use crate::models::attribute::split_enum_values;
use crate::models::{AttributeInput, AttributeKind};

/* --------------------------------------------------------------------------
   Messages
   -------------------------------------------------------------------------- */

/// Shown when a top-level product field is missing.
pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields";

/// Prefix of the message shown when a required attribute value is missing.
pub const MSG_REQUIRED_ATTRIBUTES: &str = "Please fill in all required attribute values";

/// Shown when the price cannot be parsed.
pub const MSG_INVALID_PRICE: &str = "Price must be a non-negative number";

/// Shown when a category is created or renamed to a blank name.
pub const MSG_EMPTY_CATEGORY_NAME: &str = "Category name cannot be empty";

/* --------------------------------------------------------------------------
   Validation functions
   -------------------------------------------------------------------------- */

/// `true` when the value is empty after trimming whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate a category name: non-blank.
pub fn validate_category_name(name: &str) -> Result<(), CoreError> {
    if is_blank(name) {
        return Err(CoreError::Validation(MSG_EMPTY_CATEGORY_NAME.to_string()));
    }
    Ok(())
}

/// Validate a new attribute: name and data type present, and an `enum`
/// attribute lists at least one allowed value.
pub fn validate_attribute_input(input: &AttributeInput) -> Result<(), CoreError> {
    if is_blank(&input.name) {
        return Err(CoreError::Validation(
            "Attribute name must not be empty".to_string(),
        ));
    }
    if is_blank(&input.data_type) {
        return Err(CoreError::Validation(
            "Attribute data type must not be empty".to_string(),
        ));
    }
    if AttributeKind::parse(&input.data_type) == AttributeKind::Enum
        && split_enum_values(input.enum_values.as_deref().unwrap_or("")).is_empty()
    {
        return Err(CoreError::Validation(
            "Enum attributes need at least one enum value".to_string(),
        ));
    }
    Ok(())
}

/// Parse a price typed into a form field.
///
/// Accepts any finite, non-negative decimal; surrounding whitespace is
/// ignored.
pub fn parse_price(raw: &str) -> Result<f64, CoreError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(MSG_INVALID_PRICE.to_string()))?;
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(MSG_INVALID_PRICE.to_string()));
    }
    Ok(price)
}
