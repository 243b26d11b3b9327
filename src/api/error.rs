//! API error type with IntoResponse.
//!
//! Client errors carry their message; internal errors are logged with the
//! underlying cause and rendered as a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::error::{DbError, ValidationError};

/// Body used for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// API error type with automatic HTTP status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body rejected (400).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Dependency failure (500, cause logged, never returned).
    #[error("error {action}: {source}")]
    Internal {
        /// What the handler was doing, e.g. "creating item".
        action: &'static str,
        /// Underlying failure.
        #[source]
        source: DbError,
    },
}

impl ApiError {
    /// Wrap a database failure that happened while performing `action`.
    pub fn internal(action: &'static str, source: DbError) -> Self {
        Self::Internal { action, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => {
                debug!(error = %e, "Rejected request");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::Internal { action, source } => {
                error!(error = %source, "Error {}: {}", action, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
