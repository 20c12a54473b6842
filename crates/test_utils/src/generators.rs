//! Property-Based and Fake Test Data Generators
//!
//! Proptest strategies that respect domain invariants, plus fake-data
//! helpers for generating realistic guest records in bulk.

use chrono::NaiveDate;
use core_kernel::{Currency, HotelId, Money};
use domain_stay::{Client, RoomType};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating supported Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::MGA),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::ZAR),
        Just(Currency::MUR),
    ]
}

/// Strategy for strictly positive charge amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for signed amounts in minor units
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy for positive Money values in any supported currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for positive ariary amounts
pub fn mga_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::MGA))
}

/// Strategy for signed Money values
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for room types
pub fn room_type_strategy() -> impl Strategy<Value = RoomType> {
    prop_oneof![
        Just(RoomType::Single),
        Just(RoomType::Double),
        Just(RoomType::Suite),
        Just(RoomType::Family),
        Just(RoomType::Bungalow),
    ]
}

/// Strategy for a valid stay: an arrival date plus 1 to 30 nights
pub fn stay_dates_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0i64..3650i64, 1i64..30i64).prop_map(|(offset, nights)| {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let arrival = base + chrono::Duration::days(offset);
        (arrival, arrival + chrono::Duration::days(nights))
    })
}

/// Strategy for nightly rates as whole ariary
pub fn nightly_rate_strategy() -> impl Strategy<Value = Money> {
    (10_000i64..2_000_000i64)
        .prop_map(|amount| Money::new(Decimal::from(amount), Currency::MGA))
}

/// Generates a realistic guest record with fake contact details
pub fn fake_client(hotel_id: HotelId) -> Client {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    Client::new(hotel_id, first, last)
        .with_phone(PhoneNumber().fake::<String>())
        .with_email(SafeEmail().fake::<String>())
}
