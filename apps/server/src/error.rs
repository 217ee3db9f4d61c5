//! # API Error Types
//!
//! Translation from domain and database errors to HTTP responses.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Response Bodies                             │
//! │                                                                         │
//! │  Validation failure (400):                                             │
//! │    { "error": "Validation Error",                                      │
//! │      "details": [ { "path": "notes",                                   │
//! │                     "message": "Notes are required for WASTE ..." } ] }│
//! │                                                                         │
//! │  Everything else:                                                      │
//! │    { "error": "Insufficient stock. Available: 450 mg" }   ← 400        │
//! │    { "error": "Medication not found" }                    ← 404        │
//! │    { "error": "Internal server error" }                   ← 500        │
//! │                                                                         │
//! │  Internal failures never leak driver/SQL detail to the client; the     │
//! │  specifics go to the log.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use rxledger_core::{CoreError, ValidationErrors};
use rxledger_db::DbError;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Field-level input failures, reported together.
    #[error("Validation Error")]
    Validation(ValidationErrors),

    /// Domain rule rejection (e.g. insufficient stock).
    #[error("{0}")]
    BadRequest(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// State conflict (duplicate slug, concurrent stock movement).
    #[error("{0}")]
    Conflict(String),

    /// Transient condition; the client may retry.
    #[error("{0}")]
    Unavailable(String),

    /// Anything we don't want to explain to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => ApiError::Validation(errors),
            CoreError::MedicationNotFound | CoreError::NurseNotFound | CoreError::WitnessNotFound => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::InsufficientStock { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core.into(),
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::StockConflict => ApiError::Conflict(err.to_string()),
            DbError::Busy(_) | DbError::PoolExhausted => ApiError::Unavailable(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation Error",
                    "details": errors.errors,
                })),
            )
                .into_response(),

            ApiError::BadRequest(message) => {
                error_body(StatusCode::BAD_REQUEST, &message)
            }
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, &message),
            ApiError::Conflict(message) => error_body(StatusCode::CONFLICT, &message),
            ApiError::Unavailable(message) => {
                error_body(StatusCode::SERVICE_UNAVAILABLE, &message)
            }

            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
