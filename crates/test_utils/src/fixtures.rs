//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the common entities of the system. Fixtures
//! are consistent and predictable so unit tests can assert exact values.

use chrono::NaiveDate;
use core_kernel::{ClientId, Currency, HotelId, Money, ReservationId, RoomId};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

/// The one hotel every fixture belongs to, stable across a test run
static FIXTURE_HOTEL: Lazy<HotelId> = Lazy::new(HotelId::new);

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard nightly rate in ariary
    pub fn mga_rate() -> Money {
        Money::new(dec!(100000), Currency::MGA)
    }

    /// A typical minibar charge
    pub fn mga_minibar() -> Money {
        Money::new(dec!(15000), Currency::MGA)
    }

    /// A large settling payment
    pub fn mga_large_payment() -> Money {
        Money::new(dec!(500000), Currency::MGA)
    }

    /// Zero ariary
    pub fn mga_zero() -> Money {
        Money::zero(Currency::MGA)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard arrival date
    pub fn arrival() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    /// Standard departure date, three nights later
    pub fn departure() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 4).unwrap()
    }

    /// A departure before the arrival, for validation tests
    pub fn departure_before_arrival() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// The shared fixture hotel
    pub fn hotel_id() -> HotelId {
        *FIXTURE_HOTEL
    }

    /// A fresh client id
    pub fn client_id() -> ClientId {
        ClientId::new()
    }

    /// A fresh room id
    pub fn room_id() -> RoomId {
        RoomId::new()
    }

    /// A fresh reservation id
    pub fn reservation_id() -> ReservationId {
        ReservationId::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotel_fixture_is_stable() {
        assert_eq!(IdFixtures::hotel_id(), IdFixtures::hotel_id());
    }

    #[test]
    fn test_stay_dates_are_three_nights() {
        let nights = (TemporalFixtures::departure() - TemporalFixtures::arrival()).num_days();
        assert_eq!(nights, 3);
    }
}
