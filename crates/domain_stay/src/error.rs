//! Stay domain errors

use core_kernel::PortError;
use domain_folio::FolioError;
use thiserror::Error;

/// Errors from the stay lifecycle
#[derive(Debug, Error)]
pub enum StayError {
    /// The requested state change is not in the transition table
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Another check-in claimed the room first; nothing was written
    #[error("Room {room} was claimed concurrently")]
    RoomConflict { room: String },

    /// Manual status change attempted on a room held by a stay
    #[error("Room {room} is occupied by a checked-in guest")]
    RoomOccupied { room: String },

    /// Departure not strictly after arrival, or an impossible range
    #[error("Invalid stay dates: {0}")]
    InvalidDates(String),

    /// Negative rate or acompte
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Reservation not found
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// Room not found
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Deletion refused because the stay already has ledger entries
    #[error("Reservation {reservation} has billing history and cannot be deleted")]
    HasBillingHistory { reservation: String },

    /// A cross-store sequence was interrupted and could not be compensated;
    /// the reservation is flagged for reconciliation
    #[error("Operation partially applied: {detail}")]
    PartialFailure { detail: String },

    /// Ledger-side failure surfaced through check-in or deletion guards
    #[error("Billing error: {0}")]
    Billing(#[from] FolioError),

    /// Underlying store failure; no partial mutation was applied
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl StayError {
    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        StayError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    pub fn reservation_not_found(id: impl std::fmt::Display) -> Self {
        StayError::ReservationNotFound(id.to_string())
    }

    pub fn room_not_found(id: impl std::fmt::Display) -> Self {
        StayError::RoomNotFound(id.to_string())
    }

    pub fn client_not_found(id: impl std::fmt::Display) -> Self {
        StayError::ClientNotFound(id.to_string())
    }

    pub fn partial_failure(detail: impl Into<String>) -> Self {
        StayError::PartialFailure {
            detail: detail.into(),
        }
    }
}
