//! Server error types.

use api_protocol::{ErrorBody, ErrorCode};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use lead_store::LeadStoreError;

use crate::validation::ValidationError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Lead payload failed field validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed identifier in the path or body.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Malformed identifier used as a reference or filter.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business rule forbids the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request conflicts with stored state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] LeadStoreError),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::InvalidRequest(rejection.to_string())
    }
}

impl ServerError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ServerError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_details(ErrorCode::ValidationError, e.to_string(), e.details()),
            ),
            ServerError::InvalidId(msg) | ServerError::InvalidReference(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(ErrorCode::InvalidId, msg.clone()),
            ),
            ServerError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(ErrorCode::InvalidRequest, msg.clone()),
            ),
            ServerError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(ErrorCode::NotFound, msg.clone()),
            ),
            ServerError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody::new(ErrorCode::Forbidden, msg.clone()),
            ),
            ServerError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody::new(ErrorCode::Conflict, msg.clone()),
            ),
            // A record can vanish or collide between a handler's check and its
            // write; report those like the checked cases.
            ServerError::Store(e @ LeadStoreError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(ErrorCode::NotFound, e.to_string()),
            ),
            ServerError::Store(e @ LeadStoreError::AlreadyExists { .. }) => (
                StatusCode::CONFLICT,
                ErrorBody::new(ErrorCode::Conflict, e.to_string()),
            ),
            ServerError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(ErrorCode::ServerError, "Server error"),
                )
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
