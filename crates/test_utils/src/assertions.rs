//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_folio::StayAccount;

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is negative
pub fn assert_money_negative(money: &Money) {
    assert!(
        money.is_negative(),
        "Expected negative money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the ledger identity of an account: solde equals total billed
/// minus total paid
pub fn assert_account_balanced(account: &StayAccount) {
    let expected = account
        .total_facture
        .checked_sub(&account.total_paye)
        .expect("account totals in mixed currencies");
    assert_eq!(
        account.solde(),
        expected,
        "Account {} solde drifted from its totals: facture={}, paye={}",
        account.account_number,
        account.total_facture.amount(),
        account.total_paye.amount()
    );
}
