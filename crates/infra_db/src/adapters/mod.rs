//! PostgreSQL port adapters
//!
//! One adapter per domain port. Each adapter owns its SQL, maps rows back
//! to domain aggregates and translates `DatabaseError` into `PortError`.
//! Statuses and enums are stored as text in their serde form; an
//! unrecognised value surfaces as `CorruptRow` rather than a panic.

pub mod folio;
pub mod stay;

pub use folio::PostgresFolioAdapter;
pub use stay::PostgresStayAdapter;

use std::str::FromStr;

use core_kernel::{Currency, Money};
use rust_decimal::Decimal;

use crate::error::DatabaseError;

/// Rebuilds a Money value from its NUMERIC amount and TEXT currency columns
pub(crate) fn money_from_row(amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency = Currency::from_str(currency)
        .map_err(|e| DatabaseError::CorruptRow(e.to_string()))?;
    Ok(Money::new(amount, currency))
}

/// Maps a TEXT status column back through serde
pub(crate) fn enum_from_row<T: serde::de::DeserializeOwned>(
    column: &str,
    value: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| DatabaseError::CorruptRow(format!("{} holds unknown value '{}'", column, value)))
}

/// Serializes an enum into its TEXT column form
pub(crate) fn enum_to_column<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
