//! HTTP API Layer
//!
//! REST API for the hotel stay core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for the stay lifecycle and the folio ledger
//! - **Middleware**: Authentication, authorization, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses; every domain guard maps
//!   to a distinct error body so the front desk can tell a lost room race
//!   from an invalid transition
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let state = AppState::postgres(pool, config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_folio::FolioService;
use domain_stay::StayService;
use infra_db::{PostgresFolioAdapter, PostgresStayAdapter};

use crate::config::ApiConfig;
use crate::handlers::{folio, health, stay};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stay: Arc<StayService>,
    pub folio: Arc<FolioService>,
    pub pool: PgPool,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the state over the PostgreSQL adapters
    pub fn postgres(pool: PgPool, config: ApiConfig) -> Self {
        let folio = Arc::new(FolioService::new(Arc::new(PostgresFolioAdapter::new(
            pool.clone(),
        ))));
        let stay = Arc::new(StayService::new(
            Arc::new(PostgresStayAdapter::new(pool.clone())),
            folio.clone(),
        ));
        Self {
            stay,
            folio,
            pool,
            config,
        }
    }

    /// Builds the state over caller-supplied services
    pub fn with_services(
        stay: Arc<StayService>,
        folio: Arc<FolioService>,
        pool: PgPool,
        config: ApiConfig,
    ) -> Self {
        Self {
            stay,
            folio,
            pool,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Client routes
    let client_routes = Router::new()
        .route("/", post(stay::create_client))
        .route("/", get(stay::list_clients))
        .route("/:id", get(stay::get_client))
        .route("/:id/debt", get(folio::get_client_debt));

    // Room routes
    let room_routes = Router::new()
        .route("/", post(stay::create_room))
        .route("/", get(stay::list_rooms))
        .route("/:id", get(stay::get_room))
        .route("/:id/status", put(stay::set_room_status));

    // Reservation routes
    let reservation_routes = Router::new()
        .route("/", post(stay::create_reservation))
        .route("/", get(stay::list_reservations))
        .route("/:id", get(stay::get_reservation))
        .route("/:id", delete(stay::delete_reservation))
        .route("/:id/confirm", post(stay::confirm_reservation))
        .route("/:id/checkin", post(stay::check_in))
        .route("/:id/checkout", post(stay::check_out))
        .route("/:id/cancel", post(stay::cancel_reservation))
        .route("/:id/no-show", post(stay::mark_no_show))
        .route("/:id/account", get(folio::get_account_for_reservation));

    // Account routes
    let account_routes = Router::new()
        .route("/:id", get(folio::get_account))
        .route("/:id/charges", post(folio::add_charge))
        .route("/:id/payments", post(folio::record_payment));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/rooms", room_routes)
        .nest("/reservations", reservation_routes)
        .nest("/accounts", account_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
