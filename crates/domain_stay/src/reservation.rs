//! Reservation aggregate and stay state machine

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, HotelId, Money, ReservationId, RoomId};

use crate::error::StayError;

/// Lifecycle status of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booked, not yet confirmed
    Pending,
    /// Confirmed by the hotel
    Confirmed,
    /// Guest is on site, room occupied
    CheckedIn,
    /// Stay completed
    CheckedOut,
    /// Cancelled before or during the stay
    Cancelled,
    /// Guest never arrived
    NoShow,
}

impl ReservationStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::CheckedOut
                | ReservationStatus::Cancelled
                | ReservationStatus::NoShow
        )
    }
}

/// Coarse payment progress of the stay, derived from the ledger
///
/// Never stored: always recomputed from the account's paid total and solde
/// so it cannot drift from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProgress {
    Pending,
    Partial,
    Paid,
}

impl PaymentProgress {
    /// Derives progress from the ledger figures
    pub fn derive(total_paye: Money, solde: Money) -> Self {
        if !solde.is_positive() {
            PaymentProgress::Paid
        } else if total_paye.is_positive() {
            PaymentProgress::Partial
        } else {
            PaymentProgress::Pending
        }
    }
}

/// A booking of one room for one client over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier
    pub id: ReservationId,
    /// Owning hotel
    pub hotel_id: HotelId,
    /// Guest
    pub client_id: ClientId,
    /// Booked room
    pub room_id: RoomId,
    /// Lifecycle status
    pub status: ReservationStatus,
    /// Arrival date
    pub check_in_date: NaiveDate,
    /// Departure date, strictly after arrival
    pub check_out_date: NaiveDate,
    /// Nightly rate frozen at booking time
    pub rate_per_night: Money,
    /// nights x rate, seeds the stay account at check-in
    pub total_price: Money,
    /// Deposit taken at booking
    pub acompte: Money,
    /// Free-text notes for the front desk
    pub notes: Option<String>,
    /// Set when a cross-store sequence was left half-applied
    pub needs_reconciliation: bool,
    /// Actual arrival
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Actual departure
    pub checked_out_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new pending reservation
    ///
    /// Returns `InvalidDates` unless the departure is strictly after the
    /// arrival, so every reservation covers at least one night.
    pub fn book(
        hotel_id: HotelId,
        client_id: ClientId,
        room_id: RoomId,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        rate_per_night: Money,
    ) -> Result<Self, StayError> {
        if check_out_date <= check_in_date {
            return Err(StayError::InvalidDates(format!(
                "departure {} must be after arrival {}",
                check_out_date, check_in_date
            )));
        }

        let nights = (check_out_date - check_in_date).num_days();
        let total_price = rate_per_night.multiply(Decimal::from(nights));

        let now = Utc::now();
        Ok(Self {
            id: ReservationId::new_v7(),
            hotel_id,
            client_id,
            room_id,
            status: ReservationStatus::Pending,
            check_in_date,
            check_out_date,
            rate_per_night,
            total_price,
            acompte: Money::zero(rate_per_night.currency()),
            notes: None,
            needs_reconciliation: false,
            checked_in_at: None,
            checked_out_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_acompte(mut self, acompte: Money) -> Self {
        self.acompte = acompte;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Number of nights covered
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    /// Moves the reservation through the state machine
    pub fn transition_to(&mut self, target: ReservationStatus) -> Result<(), StayError> {
        if !self.can_transition_to(target) {
            return Err(StayError::invalid_transition(self.status, target));
        }
        self.status = target;
        let now = Utc::now();
        match target {
            ReservationStatus::CheckedIn => self.checked_in_at = Some(now),
            ReservationStatus::CheckedOut => self.checked_out_at = Some(now),
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self.status, target),
            (Pending, Confirmed)
                | (Pending, CheckedIn)
                | (Pending, Cancelled)
                | (Pending, NoShow)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, CheckedOut)
                | (CheckedIn, Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn mga(n: i64) -> Money {
        Money::from_minor(n, Currency::MGA)
    }

    fn book(arrival: (i32, u32, u32), departure: (i32, u32, u32)) -> Result<Reservation, StayError> {
        Reservation::book(
            HotelId::new(),
            ClientId::new(),
            RoomId::new(),
            NaiveDate::from_ymd_opt(arrival.0, arrival.1, arrival.2).unwrap(),
            NaiveDate::from_ymd_opt(departure.0, departure.1, departure.2).unwrap(),
            mga(100_000),
        )
    }

    #[test]
    fn test_total_is_nights_times_rate() {
        let reservation = book((2026, 3, 10), (2026, 3, 13)).unwrap();
        assert_eq!(reservation.nights(), 3);
        assert_eq!(reservation.total_price.amount(), dec!(300000));
        assert_eq!(reservation.status, ReservationStatus::Pending);
    }

    #[test]
    fn test_zero_night_stay_rejected() {
        let err = book((2026, 3, 10), (2026, 3, 10)).unwrap_err();
        assert!(matches!(err, StayError::InvalidDates(_)));

        let err = book((2026, 3, 10), (2026, 3, 9)).unwrap_err();
        assert!(matches!(err, StayError::InvalidDates(_)));
    }

    #[test]
    fn test_pending_can_check_in_directly() {
        let mut reservation = book((2026, 3, 10), (2026, 3, 12)).unwrap();
        reservation.transition_to(ReservationStatus::CheckedIn).unwrap();
        assert!(reservation.checked_in_at.is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut reservation = book((2026, 3, 10), (2026, 3, 12)).unwrap();
        reservation.transition_to(ReservationStatus::Cancelled).unwrap();
        assert!(reservation.status.is_terminal());

        let err = reservation
            .transition_to(ReservationStatus::CheckedIn)
            .unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[test]
    fn test_no_show_only_before_arrival() {
        let mut reservation = book((2026, 3, 10), (2026, 3, 12)).unwrap();
        reservation.transition_to(ReservationStatus::CheckedIn).unwrap();
        let err = reservation
            .transition_to(ReservationStatus::NoShow)
            .unwrap_err();
        assert!(matches!(err, StayError::InvalidTransition { .. }));
    }

    #[test]
    fn test_checked_in_can_cancel() {
        let mut reservation = book((2026, 3, 10), (2026, 3, 12)).unwrap();
        reservation.transition_to(ReservationStatus::CheckedIn).unwrap();
        reservation.transition_to(ReservationStatus::Cancelled).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_payment_progress_derivation() {
        assert_eq!(
            PaymentProgress::derive(mga(0), mga(100_000)),
            PaymentProgress::Pending
        );
        assert_eq!(
            PaymentProgress::derive(mga(40_000), mga(60_000)),
            PaymentProgress::Partial
        );
        assert_eq!(
            PaymentProgress::derive(mga(100_000), mga(0)),
            PaymentProgress::Paid
        );
        // Overpaid counts as paid
        assert_eq!(
            PaymentProgress::derive(mga(105_000), mga(-5_000)),
            PaymentProgress::Paid
        );
    }
}
