use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// HTTP status the catalog service answers with for this error.
    pub fn status(&self) -> u16 {
        match self {
            CoreError::NotFound { .. } => 404,
            CoreError::Validation(_) => 422,
            CoreError::Conflict(_) => 409,
        }
    }

    /// Human-readable detail, as carried in the service's `detail` field.
    pub fn detail(&self) -> String {
        match self {
            CoreError::NotFound { entity, .. } => format!("{entity} not found"),
            CoreError::Validation(msg) | CoreError::Conflict(msg) => msg.clone(),
        }
    }
}
