use catalog_client::CatalogApiError;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;

/// Errors surfaced by the product form.
///
/// Every variant except [`FormError::Cancelled`] carries a single
/// operator-facing message. A failed operation never leaves the form's
/// schema and values half-updated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// A read from the catalog service failed.
    #[error("{0}")]
    FetchFailed(String),

    /// The request was superseded by a newer selection. Swallowed by the
    /// form; never shown to the operator.
    #[error("Request superseded by a newer selection")]
    Cancelled,

    /// A required field is missing or a field is malformed.
    #[error("{0}")]
    ValidationFailed(String),

    /// The service rejected a create or update.
    #[error("{0}")]
    SubmitFailed(String),

    /// The category of a product being edited cannot change.
    #[error("Category cannot be changed while editing product {product_id}")]
    CategoryLocked { product_id: DbId },

    #[error("Attribute index {index} out of range ({len} attributes)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Attribute binding {0} is not part of the current category schema")]
    UnknownBinding(DbId),
}

impl From<CoreError> for FormError {
    fn from(err: CoreError) -> Self {
        FormError::ValidationFailed(err.detail())
    }
}

/// Error surfaced by a list view: one message for the operator, plus the
/// underlying service error when there was one.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ViewError {
    pub message: String,
    #[source]
    pub source: Option<CatalogApiError>,
}

impl ViewError {
    /// A failed service call, reported under `message`.
    pub fn service(message: impl Into<String>, source: CatalogApiError) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    /// A problem caught before any call was made.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<CoreError> for ViewError {
    fn from(err: CoreError) -> Self {
        ViewError::local(err.detail())
    }
}
