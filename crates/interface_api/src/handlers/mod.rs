//! Request handlers

pub mod folio;
pub mod health;
pub mod stay;

use axum::Extension;

use core_kernel::HotelId;

use crate::auth::{has_permission, Claims};
use crate::error::ApiError;

/// Extracts the caller's hotel from the token claims
pub(crate) fn hotel_from_claims(claims: &Claims) -> Result<HotelId, ApiError> {
    claims
        .hotel_id
        .parse()
        .map_err(|_| ApiError::Unauthorized)
}

/// A record owned by another hotel reads as absent, so a guessed id never
/// confirms the record exists
pub(crate) fn check_hotel_scope(
    caller: HotelId,
    owner: HotelId,
    kind: &str,
) -> Result<(), ApiError> {
    if caller == owner {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{} not found", kind)))
    }
}

/// Rejects the request unless the token carries the permission
pub(crate) fn require_permission(
    claims: &Extension<Claims>,
    permission: &str,
) -> Result<(), ApiError> {
    if has_permission(claims, permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "missing permission '{}'",
            permission
        )))
    }
}

/// Parses a serde snake_case discriminant coming in from a request body
pub(crate) fn parse_enum<T: serde::de::DeserializeOwned>(
    field: &str,
    value: &str,
) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| ApiError::BadRequest(format!("unknown {} '{}'", field, value)))
}
