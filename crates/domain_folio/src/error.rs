//! Folio domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the folio domain
#[derive(Debug, Error)]
pub enum FolioError {
    /// Non-positive monetary value supplied
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// An account already exists for a different reservation than expected
    #[error("Account {account} is not bound to reservation {reservation}")]
    ReservationMismatch {
        account: String,
        reservation: String,
    },

    /// Currency mismatch between account and supplied amount
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Underlying store failure; no partial mutation was applied
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl FolioError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        FolioError::InvalidAmount(message.into())
    }

    pub fn account_not_found(id: impl std::fmt::Display) -> Self {
        FolioError::AccountNotFound(id.to_string())
    }
}
