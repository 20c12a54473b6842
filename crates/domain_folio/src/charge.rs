//! Consumption lines ("lignes de compte")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ChargeLineId, Money};

/// Category of a consumption line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    Restaurant,
    Minibar,
    Blanchisserie,
    Parking,
    Spa,
    Telephone,
    Autre,
}

impl ChargeType {
    /// Display label as printed on the guest folio
    pub fn label(&self) -> &'static str {
        match self {
            ChargeType::Restaurant => "Restaurant",
            ChargeType::Minibar => "Minibar",
            ChargeType::Blanchisserie => "Blanchisserie",
            ChargeType::Parking => "Parking",
            ChargeType::Spa => "Spa",
            ChargeType::Telephone => "Téléphone",
            ChargeType::Autre => "Autre",
        }
    }
}

/// One itemized charge appended to an account
///
/// Lines are immutable once created. Corrections, if ever supported, are new
/// adjustment lines rather than edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeLine {
    /// Unique identifier
    pub id: ChargeLineId,
    /// Owning account
    pub account_id: AccountId,
    /// Charge category
    pub charge_type: ChargeType,
    /// Amount, strictly positive
    pub amount: Money,
    /// Free-text description
    pub description: Option<String>,
    /// When the consumption happened
    pub created_at: DateTime<Utc>,
}

impl ChargeLine {
    /// Creates a new line (amount validation happens in the service)
    pub fn new(
        account_id: AccountId,
        charge_type: ChargeType,
        amount: Money,
        description: Option<String>,
    ) -> Self {
        Self {
            id: ChargeLineId::new_v7(),
            account_id,
            charge_type,
            amount,
            description,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_charge_type_labels() {
        assert_eq!(ChargeType::Blanchisserie.label(), "Blanchisserie");
        assert_eq!(ChargeType::Telephone.label(), "Téléphone");
    }

    #[test]
    fn test_line_serializes() {
        let line = ChargeLine::new(
            AccountId::new(),
            ChargeType::Restaurant,
            Money::new(dec!(15000), Currency::MGA),
            Some("Dîner".to_string()),
        );
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("restaurant"));
    }
}
