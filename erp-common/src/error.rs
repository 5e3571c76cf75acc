//! Domain error type shared across the ERP backend.
//!
//! Every fallible domain operation returns `CoreResult<T>`. The HTTP layer
//! maps each variant onto a status class (404, 400, 401, 403, 500); nothing
//! is retried internally.

use thiserror::Error;

/// Result type for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the domain services.
///
/// The HTTP layer matches this enum exhaustively, so adding a variant is a
/// breaking change there on purpose.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Entity was not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Entity with a unique field already exists
    #[error("{entity} already exists: {detail}")]
    AlreadyExists { entity: &'static str, detail: String },

    /// Malformed or missing required input
    #[error("{0}")]
    Validation(String),

    /// Requested quantity exceeds the available stock
    #[error("Insufficient stock for product {product}. Needed: {requested}, Available: {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// Status change disallowed from the current state
    #[error("{0}")]
    InvalidTransition(String),

    /// Status value outside the recognized set
    #[error("Invalid status")]
    InvalidStatus,

    /// Caller identity missing or invalid
    #[error("{0}")]
    Unauthorized(String),

    /// Caller identity valid but lacks the required role
    #[error("{0}")]
    Forbidden(String),

    /// Persistence layer failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Create a NotFound error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an AlreadyExists error
    pub fn already_exists(entity: &'static str, detail: impl Into<String>) -> Self {
        CoreError::AlreadyExists {
            entity,
            detail: detail.into(),
        }
    }

    /// Create a Validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        CoreError::Validation(reason.into())
    }

    /// Create an Unauthorized error
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        CoreError::Unauthorized(reason.into())
    }

    /// Create a Forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden(reason.into())
    }

    /// Create a Storage error
    pub fn storage(reason: impl Into<String>) -> Self {
        CoreError::Storage(reason.into())
    }

    /// Returns true if the error maps to a 404 status class
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}
