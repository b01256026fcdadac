//! API error body and codes.

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, mistyped, or out-of-enum fields
    ValidationError,
    /// A malformed entity identifier
    InvalidId,
    /// The request could not be understood
    InvalidRequest,
    /// The referenced entity does not exist
    NotFound,
    /// A business rule forbids the action
    Forbidden,
    /// The request conflicts with the current state
    Conflict,
    /// Unexpected or storage failure
    ServerError,
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Error code
    pub code: ErrorCode,
    /// Per-field messages, only for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorBody {
    /// Creates a new error body
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    /// Creates a new error body with per-field details
    pub fn with_details(code: ErrorCode, error: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            error: error.into(),
            code,
            details: Some(details),
        }
    }
}
