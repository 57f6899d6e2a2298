//! Domain error shared by the catalog, entitlement and progress modules.

/// Failure of a domain operation, independent of transport.
///
/// The API crate maps each variant onto one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A learner, course, chapter, lesson or grant does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed input, e.g. a temporary grant without `end_at` or a price
    /// list missing its lifetime tier.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A grant with the same key already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller may not touch another learner's records.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a [`CoreError::NotFound`] from any string-like id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
