//! Tests for the stay lifecycle domain types

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, HotelId, Money, RoomId};

use domain_stay::{
    PaymentProgress, Reservation, ReservationStatus, Room, RoomStatus, RoomType, StayError,
};

fn mga(n: i64) -> Money {
    Money::from_minor(n, Currency::MGA)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn book(arrival: NaiveDate, departure: NaiveDate, rate: i64) -> Result<Reservation, StayError> {
    Reservation::book(
        HotelId::new(),
        ClientId::new(),
        RoomId::new(),
        arrival,
        departure,
        mga(rate),
    )
}

// ============================================================================
// Reservation state machine
// ============================================================================

mod reservation_tests {
    use super::*;

    #[test]
    fn test_full_happy_path() {
        let mut reservation = book(date(2026, 3, 10), date(2026, 3, 13), 100_000).unwrap();
        reservation.transition_to(ReservationStatus::Confirmed).unwrap();
        reservation.transition_to(ReservationStatus::CheckedIn).unwrap();
        reservation.transition_to(ReservationStatus::CheckedOut).unwrap();

        assert!(reservation.checked_in_at.is_some());
        assert!(reservation.checked_out_at.is_some());
        assert!(reservation.status.is_terminal());
    }

    #[test]
    fn test_checked_out_admits_nothing() {
        let mut reservation = book(date(2026, 3, 10), date(2026, 3, 11), 100_000).unwrap();
        reservation.transition_to(ReservationStatus::CheckedIn).unwrap();
        reservation.transition_to(ReservationStatus::CheckedOut).unwrap();

        for target in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::CheckedIn,
            ReservationStatus::Cancelled,
            ReservationStatus::NoShow,
        ] {
            assert!(reservation.transition_to(target).is_err());
        }
    }

    #[test]
    fn test_total_uses_booked_rate() {
        let reservation = book(date(2026, 7, 1), date(2026, 7, 8), 250_000).unwrap();
        assert_eq!(reservation.nights(), 7);
        assert_eq!(reservation.total_price.amount(), dec!(1750000));
        assert_eq!(reservation.rate_per_night.amount(), dec!(250000));
    }

    #[test]
    fn test_acompte_defaults_to_zero() {
        let reservation = book(date(2026, 3, 10), date(2026, 3, 12), 100_000).unwrap();
        assert!(reservation.acompte.is_zero());
        assert!(!reservation.needs_reconciliation);

        let with_deposit = book(date(2026, 3, 10), date(2026, 3, 12), 100_000)
            .unwrap()
            .with_acompte(mga(50_000));
        assert_eq!(with_deposit.acompte.amount(), dec!(50000));
    }
}

// ============================================================================
// Room status machine
// ============================================================================

mod room_tests {
    use super::*;

    fn room() -> Room {
        Room::new(HotelId::new(), "201", RoomType::Suite, mga(250_000))
    }

    #[test]
    fn test_occupied_unreachable_by_override() {
        for from in [
            RoomStatus::Available,
            RoomStatus::Cleaning,
            RoomStatus::Maintenance,
            RoomStatus::OutOfService,
        ] {
            let mut room = room();
            room.status = from;
            assert!(
                room.check_override(RoomStatus::Occupied).is_err(),
                "override to occupied from {:?} must fail",
                from
            );
        }
    }

    #[test]
    fn test_cleaning_returns_to_available() {
        let mut room = room();
        room.status = RoomStatus::Cleaning;
        assert!(room.check_override(RoomStatus::Available).is_ok());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RoomStatus::Available.label(), "Disponible");
        assert_eq!(RoomStatus::OutOfService.label(), "Hors service");
    }

    #[test]
    fn test_room_status_serializes_snake_case() {
        let json = serde_json::to_string(&RoomStatus::OutOfService).unwrap();
        assert_eq!(json, "\"out_of_service\"");
        let back: RoomStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RoomStatus::OutOfService);
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_total_is_nights_times_rate(
            rate in 1_000i64..2_000_000,
            nights in 1i64..60,
        ) {
            let arrival = date(2026, 1, 1);
            let departure = arrival + chrono::Duration::days(nights);
            let reservation = book(arrival, departure, rate).unwrap();

            prop_assert_eq!(reservation.nights(), nights);
            prop_assert_eq!(
                reservation.total_price.amount(),
                mga(rate).multiply(nights.into()).amount()
            );
        }

        #[test]
        fn prop_non_positive_stay_rejected(offset in -30i64..=0) {
            let arrival = date(2026, 6, 15);
            let departure = arrival + chrono::Duration::days(offset);
            prop_assert!(book(arrival, departure, 100_000).is_err());
        }

        #[test]
        fn prop_progress_consistent(facture in 0i64..3_000_000, paye in 0i64..3_000_000) {
            let solde = mga(facture) - mga(paye);
            let progress = PaymentProgress::derive(mga(paye), solde);

            if paye >= facture {
                prop_assert_eq!(progress, PaymentProgress::Paid);
            } else if paye > 0 {
                prop_assert_eq!(progress, PaymentProgress::Partial);
            } else {
                prop_assert_eq!(progress, PaymentProgress::Pending);
            }
        }
    }
}
