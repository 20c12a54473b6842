//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the stay and folio domain ports, implemented
//! with SQLx. The adapters own all SQL: the domains never see a row, only
//! their own aggregates.
//!
//! # Concurrency
//!
//! Room status changes are conditional updates (`... WHERE status = $n`),
//! so the database is the arbiter when two front desks race. Account
//! creation relies on a unique index over `reservation_id` with
//! `ON CONFLICT DO NOTHING`, which is what makes lazy account opening
//! idempotent under load.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PostgresStayAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/hotel")).await?;
//! let stay_port = PostgresStayAdapter::new(pool.clone());
//! ```

pub mod adapters;
pub mod error;
pub mod pool;

pub use adapters::{PostgresFolioAdapter, PostgresStayAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
