//! Stay account ("compte client") aggregate
//!
//! One account per stay, created when the guest checks in or lazily on the
//! first payment. Totals are always recomputed from the durable line and
//! payment sets, never incremented in place, so concurrent writers cannot
//! lose updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ClientId, HotelId, Money, ReservationId};

/// Account settlement status
///
/// `Dette` is an explicit operator flag for problem debt. It is sticky: it
/// survives partial payments and only resolves (to `Solde`) once the balance
/// reaches zero or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Open with a positive balance (or untouched)
    Ouvert,
    /// Fully settled (solde <= 0, overpayment included)
    Solde,
    /// Explicitly flagged overdue debt
    Dette,
}

impl AccountStatus {
    /// Derives the status from a balance, honoring the sticky debt flag
    pub fn derive(solde: Money, previous: AccountStatus) -> AccountStatus {
        if !solde.is_positive() {
            AccountStatus::Solde
        } else if previous == AccountStatus::Dette {
            AccountStatus::Dette
        } else {
            AccountStatus::Ouvert
        }
    }
}

/// The per-stay billing account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayAccount {
    /// Unique identifier
    pub id: AccountId,
    /// Tenant
    pub hotel_id: HotelId,
    /// The stay this account bills (1:1)
    pub reservation_id: ReservationId,
    /// The guest, kept here so the debt aggregate can fold over a client's
    /// accounts without going through reservations
    pub client_id: ClientId,
    /// Human-readable account number
    pub account_number: String,
    /// Baseline room charge seeded at opening, immutable; folded totals are
    /// always `initial_charge + sum(lines)`
    pub initial_charge: Money,
    /// Sum of the baseline room charge and all consumption lines
    pub total_facture: Money,
    /// Sum of all payments
    pub total_paye: Money,
    /// Settlement status
    pub status: AccountStatus,
    /// Account currency
    pub currency: core_kernel::Currency,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StayAccount {
    /// Opens a new account seeded with the baseline room charge
    pub fn open(
        hotel_id: HotelId,
        reservation_id: ReservationId,
        client_id: ClientId,
        initial_charge: Money,
    ) -> Self {
        let now = Utc::now();
        let currency = initial_charge.currency();

        Self {
            id: AccountId::new_v7(),
            hotel_id,
            reservation_id,
            client_id,
            account_number: generate_account_number(),
            initial_charge,
            total_facture: initial_charge,
            total_paye: Money::zero(currency),
            status: AccountStatus::derive(initial_charge, AccountStatus::Ouvert),
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// The outstanding balance: total_facture - total_paye
    pub fn solde(&self) -> Money {
        self.total_facture - self.total_paye
    }

    /// Replaces the totals with freshly folded values and re-derives status
    pub fn apply_totals(&mut self, total_facture: Money, total_paye: Money) {
        self.total_facture = total_facture;
        self.total_paye = total_paye;
        self.status = AccountStatus::derive(self.solde(), self.status);
        self.updated_at = Utc::now();
    }

    /// Flags the account as problem debt; no-op on a settled account
    pub fn flag_debt(&mut self) {
        if self.solde().is_positive() {
            self.status = AccountStatus::Dette;
            self.updated_at = Utc::now();
        }
    }

    /// Snapshot of the derived figures
    pub fn summary(&self) -> BalanceSummary {
        BalanceSummary {
            account_id: self.id,
            total_facture: self.total_facture,
            total_paye: self.total_paye,
            solde: self.solde(),
            status: self.status,
        }
    }
}

/// Read-only balance snapshot returned by `FolioService::balance_summary`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub account_id: AccountId,
    pub total_facture: Money,
    pub total_paye: Money,
    pub solde: Money,
    pub status: AccountStatus,
}

/// Generates a unique human-readable account number
///
/// Format: CMP-{epoch millis mod 10^10}
fn generate_account_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CMP-{}", duration.as_millis() % 10_000_000_000)
}
