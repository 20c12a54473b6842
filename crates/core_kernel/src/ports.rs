//! Ports and Adapters Infrastructure
//!
//! The domain crates define port traits describing everything they need from
//! their data stores; adapters (PostgreSQL in `infra_db`, in-memory mocks for
//! testing) implement them. The domain only ever sees `PortError`, never a
//! driver-specific error type.
//!
//! ```rust,ignore
//! // In domain_stay/src/ports.rs
//! #[async_trait]
//! pub trait StayPort: DomainPort {
//!     async fn get_room(&self, id: RoomId) -> Result<Room, PortError>;
//! }
//!
//! // In infra_db - internal adapter
//! impl StayPort for PostgresStayAdapter { ... }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The operation conflicts with existing data, including a failed
    /// conditional (compare-and-swap) update
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may
    /// succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error is a conflict (e.g., a lost
    /// compare-and-swap race)
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Room", "ROOM-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Room"));
        assert!(error.to_string().contains("ROOM-123"));
    }

    #[test]
    fn test_port_error_conflict() {
        let error = PortError::conflict("room already occupied");
        assert!(error.is_conflict());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_port_error_transient() {
        let connection = PortError::connection("pool exhausted");
        assert!(connection.is_transient());

        let validation = PortError::validation("amount must be positive");
        assert!(!validation.is_transient());
    }
}
