//! Money behavior tests

use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, MoneyError};

#[test]
fn test_mga_has_no_minor_unit() {
    assert_eq!(Currency::MGA.decimal_places(), 0);
    assert_eq!(Currency::EUR.decimal_places(), 2);
}

#[test]
fn test_display_rounds_to_currency() {
    let m = Money::new(dec!(1234.5), Currency::MGA);
    assert_eq!(m.to_string(), "Ar 1235");

    let e = Money::new(dec!(12.345), Currency::EUR);
    assert_eq!(e.to_string(), "€ 12.35");
}

#[test]
fn test_round_to_currency() {
    let m = Money::new(dec!(100.4999), Currency::MGA).round_to_currency();
    assert_eq!(m.amount(), dec!(100));
}

#[test]
fn test_zero_is_neither_positive_nor_negative() {
    let z = Money::zero(Currency::MGA);
    assert!(z.is_zero());
    assert!(!z.is_positive());
    assert!(!z.is_negative());
}

#[test]
fn test_checked_sub_can_go_negative() {
    // An overpaid folio legitimately has a negative solde
    let facture = Money::new(dec!(115000), Currency::MGA);
    let paye = Money::new(dec!(120000), Currency::MGA);

    let solde = facture.checked_sub(&paye).unwrap();
    assert!(solde.is_negative());
    assert_eq!(solde.amount(), dec!(-5000));
}

#[test]
fn test_mixed_currency_rejected() {
    let a = Money::new(dec!(10), Currency::MGA);
    let b = Money::new(dec!(10), Currency::MUR);

    assert!(matches!(
        a.checked_sub(&b),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn test_many_small_lines_do_not_drift() {
    // 1000 lines of 12.34 must sum exactly
    let line = Money::new(dec!(12.34), Currency::EUR);
    let total = (0..1000).fold(Money::zero(Currency::EUR), |acc, _| acc + line);
    assert_eq!(total.amount(), dec!(12340.00));
}
