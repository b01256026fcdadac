//! Lead store error types.

use thiserror::Error;

/// Errors that can occur during lead store operations.
#[derive(Debug, Error)]
pub enum LeadStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Duplicate entity.
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded.
    #[error("Corrupt {column} value: {value}")]
    Corrupt { column: &'static str, value: String },

    /// A value does not fit its column.
    #[error("Value out of range for {column}: {value}")]
    OutOfRange { column: &'static str, value: String },
}

impl LeadStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an out of range error.
    pub fn out_of_range(column: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange {
            column,
            value: value.to_string(),
        }
    }

    /// Creates a corrupt column error.
    pub fn corrupt(column: &'static str, value: impl Into<String>) -> Self {
        Self::Corrupt {
            column,
            value: value.into(),
        }
    }
}

/// Result type for lead store operations.
pub type LeadStoreResult<T> = Result<T, LeadStoreError>;
