//! Folio Domain - Per-Stay Billing Ledger
//!
//! This crate implements the "compte client" for one hotel stay: an
//! append-only ledger of consumption lines and payments bound 1:1 to a
//! reservation, with derived totals and a balance-driven status.
//!
//! # Invariants
//!
//! - `solde == total_facture - total_paye` at all times
//! - `total_facture` and `total_paye` only ever grow; historical lines and
//!   payments are never edited or deleted
//! - `status` is a pure function of the solde, apart from the sticky
//!   `Dette` override, which resolves to `Solde` as soon as the balance
//!   reaches zero or below
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_folio::{FolioService, ChargeType, PaymentMethod};
//!
//! let account = service.ensure_account(reservation_id, hotel_id, client_id, room_total).await?;
//! service.add_charge(account.id, ChargeType::Restaurant, dec!(15000), None).await?;
//! service.record_payment(account.id, dec!(115000), PaymentMethod::Especes, None, None).await?;
//! ```

pub mod account;
pub mod charge;
pub mod error;
pub mod events;
pub mod payment;
pub mod ports;
pub mod service;

pub use account::{AccountStatus, BalanceSummary, StayAccount};
pub use charge::{ChargeLine, ChargeType};
pub use error::FolioError;
pub use events::FolioEvent;
pub use payment::{Payment, PaymentMethod};
pub use ports::FolioPort;
pub use service::FolioService;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockFolioPort;
