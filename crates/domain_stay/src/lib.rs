//! Stay lifecycle domain
//!
//! Owns the operational side of a stay: rooms, clients, reservations and the
//! state machines that govern them. Check-in and check-out bridge into the
//! billing ledger (`domain_folio`): arriving opens the stay account seeded
//! with the room total, departure leaves the ledger untouched so unpaid
//! balances survive as client debt.

pub mod client;
pub mod error;
pub mod events;
pub mod housekeeping;
pub mod ports;
pub mod reservation;
pub mod room;
pub mod service;

pub use client::Client;
pub use error::StayError;
pub use events::StayEvent;
pub use housekeeping::{HousekeepingSweeper, CLEANING_EXPIRY};
pub use ports::StayPort;
pub use reservation::{PaymentProgress, Reservation, ReservationStatus};
pub use room::{Room, RoomStatus, RoomType};
pub use service::StayService;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockStayPort;
