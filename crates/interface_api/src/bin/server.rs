//! Hotel Stay Core - API Server Binary
//!
//! Starts the HTTP API for the stay lifecycle and billing ledger.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin hotel-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin hotel-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_HOTEL_ID` - Hotel swept by the housekeeping task (optional)
//! * `API_CLEANING_EXPIRY_SECS` - Cleaning expiry for the sweep (default: 1800)
//! * `API_SWEEP_INTERVAL_SECS` - Pause between sweep passes (default: 60)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HotelId;
use domain_stay::HousekeepingSweeper;
use infra_db::PostgresStayAdapter;
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Hotel Stay Core API Server"
    );

    let pool = create_database_pool(&config.database_url).await?;

    tracing::info!("Running database migrations...");
    infra_db::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    // The sweep is optional: without a configured hotel the rooms simply
    // stay in cleaning until an operator releases them.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = spawn_sweeper(&config, &pool, shutdown_rx)?;

    let state = AppState::postgres(pool, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper_handle {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables, falling back to
/// individual variables and defaults.
fn load_config() -> Result<ApiConfig, Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env().unwrap_or_else(|_| {
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("API_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration_secs: std::env::var("API_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("API_DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            log_level: std::env::var("API_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            cleaning_expiry_secs: std::env::var("API_CLEANING_EXPIRY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cleaning_expiry_secs),
            sweep_interval_secs: std::env::var("API_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sweep_interval_secs),
            hotel_id: std::env::var("API_HOTEL_ID").ok(),
        }
    });

    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Creates a PostgreSQL connection pool.
async fn create_database_pool(database_url: &str) -> Result<sqlx::PgPool, infra_db::DatabaseError> {
    tracing::info!("Connecting to database...");
    let pool = infra_db::create_pool(infra_db::DatabaseConfig::new(database_url)).await?;
    tracing::info!("Database connection established");
    Ok(pool)
}

/// Spawns the housekeeping sweep for the configured hotel, if any.
fn spawn_sweeper(
    config: &ApiConfig,
    pool: &sqlx::PgPool,
    shutdown: watch::Receiver<bool>,
) -> Result<Option<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error>> {
    let Some(raw) = config.hotel_id.as_deref() else {
        tracing::warn!("API_HOTEL_ID not set, housekeeping sweep disabled");
        return Ok(None);
    };
    let hotel_id: HotelId = raw.parse()?;

    let sweeper = HousekeepingSweeper::new(
        Arc::new(PostgresStayAdapter::new(pool.clone())),
        hotel_id,
    )
    .with_expiry(Duration::from_secs(config.cleaning_expiry_secs))
    .with_interval(Duration::from_secs(config.sweep_interval_secs));

    tracing::info!(%hotel_id, "Housekeeping sweep enabled");
    Ok(Some(tokio::spawn(sweeper.run(shutdown))))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
