//! Payment records ("encaissements")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Money, PaymentId};

/// How the guest paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    Especes,
    /// Card
    CarteBancaire,
    MobileMoney,
    /// Bank transfer
    Virement,
}

impl PaymentMethod {
    /// True for methods that usually carry an external reference
    /// (the reference stays optional either way; front desks capture it
    /// when they have it)
    pub fn expects_reference(&self) -> bool {
        matches!(self, PaymentMethod::CarteBancaire | PaymentMethod::Virement)
    }
}

/// A payment appended to an account, immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Owning account
    pub account_id: AccountId,
    /// Amount, strictly positive
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// External reference (card slip, transfer id)
    pub reference: Option<String>,
    /// Free-text remark
    pub remark: Option<String>,
    /// When the payment was taken
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        account_id: AccountId,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        remark: Option<String>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            account_id,
            amount,
            method,
            reference,
            remark,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_expectation() {
        assert!(PaymentMethod::CarteBancaire.expects_reference());
        assert!(PaymentMethod::Virement.expects_reference());
        assert!(!PaymentMethod::Especes.expects_reference());
        assert!(!PaymentMethod::MobileMoney.expects_reference());
    }
}
