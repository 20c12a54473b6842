//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::Claims;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores the operator claims in the
/// request extensions for the permission gates downstream
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = bearer else {
        warn!("Missing or invalid Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match crate::auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!("Token validation failed: {:?}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Audit logging middleware
///
/// Every front-desk money movement must be traceable to an operator and
/// a hotel, so mutations are logged at a higher priority than reads
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let (operator, hotel) = request
        .extensions()
        .get::<Claims>()
        .map(|c| (c.sub.clone(), c.hotel_id.clone()))
        .unwrap_or_else(|| ("anonymous".to_string(), "-".to_string()));

    let start = Utc::now();
    let response = next.run(request).await;
    let duration = Utc::now() - start;
    let status = response.status();

    if method == Method::GET {
        tracing::debug!(
            method = %method,
            uri = %uri,
            operator = %operator,
            hotel = %hotel,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API request"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            operator = %operator,
            hotel = %hotel,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API mutation"
        );
    }

    response
}
