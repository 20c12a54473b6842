//! API error handling
//!
//! Every domain guard maps to its own `error` discriminant so clients can
//! distinguish a lost room race (`room_conflict`, retry another room) from
//! an invalid transition (`invalid_transition`, a stale screen) without
//! parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_folio::FolioError;
use domain_stay::StayError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Room conflict: {0}")]
    RoomConflict(String),

    #[error("Room occupied: {0}")]
    RoomOccupied(String),

    #[error("Has billing history: {0}")]
    HasBillingHistory(String),

    #[error("Partially applied: {0}")]
    PartialFailure(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", msg.clone())
            }
            ApiError::RoomConflict(msg) => (StatusCode::CONFLICT, "room_conflict", msg.clone()),
            ApiError::RoomOccupied(msg) => (StatusCode::CONFLICT, "room_occupied", msg.clone()),
            ApiError::HasBillingHistory(msg) => {
                (StatusCode::CONFLICT, "has_billing_history", msg.clone())
            }
            ApiError::PartialFailure(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "partial_failure",
                msg.clone(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            ApiError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.clone(),
            ),
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StayError> for ApiError {
    fn from(err: StayError) -> Self {
        match err {
            StayError::ReservationNotFound(_)
            | StayError::RoomNotFound(_)
            | StayError::ClientNotFound(_) => ApiError::NotFound(err.to_string()),
            StayError::InvalidTransition { .. } => ApiError::InvalidTransition(err.to_string()),
            StayError::RoomConflict { .. } => ApiError::RoomConflict(err.to_string()),
            StayError::RoomOccupied { .. } => ApiError::RoomOccupied(err.to_string()),
            StayError::HasBillingHistory { .. } => ApiError::HasBillingHistory(err.to_string()),
            StayError::InvalidDates(_) | StayError::InvalidAmount(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StayError::PartialFailure { .. } => ApiError::PartialFailure(err.to_string()),
            StayError::Billing(folio_err) => folio_err.into(),
            StayError::Storage(_) => ApiError::Database(err.to_string()),
        }
    }
}

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::AccountNotFound(_) => ApiError::NotFound(err.to_string()),
            FolioError::InvalidAmount(_)
            | FolioError::CurrencyMismatch { .. }
            | FolioError::ReservationMismatch { .. } => ApiError::BadRequest(err.to_string()),
            FolioError::Storage(_) => ApiError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
