//! Domain events for the folio ledger
//!
//! Emitted after successful mutations so observers (dashboards, list views)
//! can refresh. Delivery is best-effort: a lagging or absent subscriber never
//! fails the originating operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ChargeLineId, PaymentId, ReservationId};

use crate::account::AccountStatus;

/// Events emitted by the folio ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FolioEvent {
    /// A new account was opened for a stay
    AccountOpened {
        account_id: AccountId,
        reservation_id: ReservationId,
        initial_charge: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// A consumption line was appended
    ChargeAdded {
        account_id: AccountId,
        line_id: ChargeLineId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// A payment was recorded
    PaymentRecorded {
        account_id: AccountId,
        payment_id: PaymentId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Totals changed; carries the fresh derived figures
    BalanceChanged {
        account_id: AccountId,
        solde: Decimal,
        status: AccountStatus,
        timestamp: DateTime<Utc>,
    },
}
