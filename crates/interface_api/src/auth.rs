//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Hotel the token is scoped to
    pub hotel_id: String,
    /// User's permissions
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
pub fn create_token(
    user_id: &str,
    hotel_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        hotel_id: hotel_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// Checks if user has the required permission
pub fn has_permission(claims: &Claims, required: &str) -> bool {
    claims.roles.iter().any(|r| r == required || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const RESERVATION_READ: &str = "reservation:read";
    pub const RESERVATION_WRITE: &str = "reservation:write";
    pub const RESERVATION_CHECKIN: &str = "reservation:checkin";
    pub const RESERVATION_CHECKOUT: &str = "reservation:checkout";
    pub const RESERVATION_CANCEL: &str = "reservation:cancel";
    pub const ROOM_READ: &str = "room:read";
    pub const ROOM_WRITE: &str = "room:write";
    pub const ROOM_OVERRIDE: &str = "room:override";
    pub const CLIENT_READ: &str = "client:read";
    pub const CLIENT_WRITE: &str = "client:write";
    pub const FOLIO_READ: &str = "folio:read";
    pub const FOLIO_CHARGE: &str = "folio:charge";
    pub const FOLIO_ENCAISSER: &str = "folio:encaisser";
}
