//! Folio ledger service
//!
//! Orchestrates the append-only ledger over a `FolioPort`. Totals are always
//! recomputed as a fold over the durable line and payment sets rather than
//! incremented from a cached value, so two concurrent writers against the
//! same account cannot lose an update: the last fold sees both entries.
//! The fold runs at the store boundary, in the same atomic operation as the
//! append, so a storage failure can never strand a durable entry behind
//! stale stored totals.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use chrono::Utc;
use core_kernel::{AccountId, ClientId, Currency, HotelId, Money, ReservationId};

use crate::account::{BalanceSummary, StayAccount};
use crate::charge::{ChargeLine, ChargeType};
use crate::error::FolioError;
use crate::events::FolioEvent;
use crate::payment::{Payment, PaymentMethod};
use crate::ports::FolioPort;

/// Application service for the per-stay billing ledger
pub struct FolioService {
    port: Arc<dyn FolioPort>,
    events: Option<broadcast::Sender<FolioEvent>>,
}

impl FolioService {
    /// Creates a new service over the given store adapter
    pub fn new(port: Arc<dyn FolioPort>) -> Self {
        Self { port, events: None }
    }

    /// Attaches a best-effort event channel for observers
    pub fn with_events(mut self, sender: broadcast::Sender<FolioEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Lazily creates the account for a reservation, seeding the baseline
    /// room charge
    ///
    /// Idempotent: calling twice for the same reservation returns the same
    /// account and never doubles the baseline.
    #[instrument(skip(self))]
    pub async fn ensure_account(
        &self,
        reservation_id: ReservationId,
        hotel_id: HotelId,
        client_id: ClientId,
        initial_charge: Money,
    ) -> Result<StayAccount, FolioError> {
        if let Some(existing) = self.port.find_account_by_reservation(reservation_id).await? {
            return Ok(existing);
        }

        let account = StayAccount::open(hotel_id, reservation_id, client_id, initial_charge);
        let stored = self.port.insert_account(&account).await?;

        if stored.id == account.id {
            debug!(account = %stored.account_number, "opened stay account");
            self.notify(FolioEvent::AccountOpened {
                account_id: stored.id,
                reservation_id,
                initial_charge: initial_charge.amount(),
                timestamp: Utc::now(),
            });
        }

        Ok(stored)
    }

    /// Appends a consumption line and recomputes the balance
    #[instrument(skip(self, description))]
    pub async fn add_charge(
        &self,
        account_id: AccountId,
        charge_type: ChargeType,
        amount: Money,
        description: Option<String>,
    ) -> Result<ChargeLine, FolioError> {
        let account = self.load_account(account_id).await?;
        self.check_amount(&account, amount)?;

        let line = ChargeLine::new(account_id, charge_type, amount, description);
        let account = self.port.append_charge(&line).await?;

        let summary = account.summary();
        self.notify(FolioEvent::ChargeAdded {
            account_id,
            line_id: line.id,
            amount: amount.amount(),
            timestamp: Utc::now(),
        });
        self.notify_balance(&summary);

        Ok(line)
    }

    /// Records a payment ("encaisser") and recomputes the balance
    ///
    /// Overpayment is permitted: the solde goes negative and the account
    /// settles to `Solde`; it is surfaced through the balance event, never
    /// rejected.
    #[instrument(skip(self, reference, remark))]
    pub async fn record_payment(
        &self,
        account_id: AccountId,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        remark: Option<String>,
    ) -> Result<Payment, FolioError> {
        let account = self.load_account(account_id).await?;
        self.check_amount(&account, amount)?;

        if reference.is_none() && method.expects_reference() {
            // Missing reference is logged, never rejected
            debug!(%account_id, ?method, "payment recorded without external reference");
        }

        let payment = Payment::new(account_id, amount, method, reference, remark);
        let account = self.port.append_payment(&payment).await?;

        let summary = account.summary();
        self.notify(FolioEvent::PaymentRecorded {
            account_id,
            payment_id: payment.id,
            amount: amount.amount(),
            timestamp: Utc::now(),
        });
        self.notify_balance(&summary);

        Ok(payment)
    }

    /// Pure read of the derived balance figures
    pub async fn balance_summary(&self, account_id: AccountId) -> Result<BalanceSummary, FolioError> {
        let account = self.load_account(account_id).await?;
        Ok(account.summary())
    }

    /// Explicitly flags an account as problem debt (sticky until settled)
    #[instrument(skip(self))]
    pub async fn flag_debt(&self, account_id: AccountId) -> Result<StayAccount, FolioError> {
        let mut account = self.load_account(account_id).await?;
        account.flag_debt();
        self.port.update_account(&account).await?;
        self.notify_balance(&account.summary());
        Ok(account)
    }

    /// Fetches an account by id
    pub async fn account(&self, account_id: AccountId) -> Result<StayAccount, FolioError> {
        self.load_account(account_id).await
    }

    /// Fetches the account attached to a reservation, if one was opened
    pub async fn account_for_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<StayAccount>, FolioError> {
        Ok(self.port.find_account_by_reservation(reservation_id).await?)
    }

    /// Lists an account's charge lines and payments in entry order
    pub async fn account_entries(
        &self,
        account_id: AccountId,
    ) -> Result<(Vec<ChargeLine>, Vec<Payment>), FolioError> {
        let charges = self.port.list_charges(account_id).await?;
        let payments = self.port.list_payments(account_id).await?;
        Ok((charges, payments))
    }

    /// True when the reservation's account has at least one line or payment
    ///
    /// Used by the lifecycle side to refuse deleting reservations that
    /// already carry billing history. The baseline room charge alone does
    /// not count as activity.
    pub async fn has_activity(&self, reservation_id: ReservationId) -> Result<bool, FolioError> {
        let Some(account) = self.port.find_account_by_reservation(reservation_id).await? else {
            return Ok(false);
        };
        if !self.port.list_charges(account.id).await?.is_empty() {
            return Ok(true);
        }
        Ok(!self.port.list_payments(account.id).await?.is_empty())
    }

    /// Derived client debt aggregate ("argent dû"): the fold of positive
    /// soldes over the client's accounts. Computed on read, never stored.
    pub async fn client_debt(
        &self,
        client_id: ClientId,
        currency: Currency,
    ) -> Result<Money, FolioError> {
        let accounts = self.port.list_accounts_for_client(client_id).await?;

        let mut debt = Money::zero(currency);
        for account in &accounts {
            let solde = account.solde();
            if solde.is_positive() {
                debt = debt.checked_add(&solde).map_err(|_| {
                    FolioError::CurrencyMismatch {
                        expected: currency.to_string(),
                        actual: solde.currency().to_string(),
                    }
                })?;
            }
        }
        Ok(debt)
    }

    async fn load_account(&self, account_id: AccountId) -> Result<StayAccount, FolioError> {
        self.port.get_account(account_id).await.map_err(|e| {
            if e.is_not_found() {
                FolioError::account_not_found(account_id)
            } else {
                FolioError::Storage(e)
            }
        })
    }

    fn check_amount(&self, account: &StayAccount, amount: Money) -> Result<(), FolioError> {
        if !amount.is_positive() {
            return Err(FolioError::invalid_amount(format!(
                "amount must be strictly positive, got {}",
                amount.amount()
            )));
        }
        if amount.currency() != account.currency {
            return Err(FolioError::CurrencyMismatch {
                expected: account.currency.to_string(),
                actual: amount.currency().to_string(),
            });
        }
        Ok(())
    }

    fn notify_balance(&self, summary: &BalanceSummary) {
        self.notify(FolioEvent::BalanceChanged {
            account_id: summary.account_id,
            solde: summary.solde.amount(),
            status: summary.status,
            timestamp: Utc::now(),
        });
    }

    fn notify(&self, event: FolioEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                // No live subscriber; best-effort delivery only
                warn!("folio event dropped: no subscribers");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStatus;
    use crate::ports::mock::MockFolioPort;
    use rust_decimal_macros::dec;

    fn mga(n: i64) -> Money {
        Money::from_minor(n, Currency::MGA)
    }

    fn service() -> FolioService {
        FolioService::new(Arc::new(MockFolioPort::new()))
    }

    async fn open_account(service: &FolioService, baseline: i64) -> StayAccount {
        service
            .ensure_account(
                ReservationId::new(),
                HotelId::new(),
                ClientId::new(),
                mga(baseline),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_baseline_account() {
        let service = service();
        let account = open_account(&service, 100_000).await;

        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_facture.amount(), dec!(100000));
        assert_eq!(summary.total_paye.amount(), dec!(0));
        assert_eq!(summary.solde.amount(), dec!(100000));
        assert_eq!(summary.status, AccountStatus::Ouvert);
    }

    #[tokio::test]
    async fn test_charge_then_settle() {
        let service = service();
        let account = open_account(&service, 100_000).await;

        service
            .add_charge(account.id, ChargeType::Restaurant, mga(15_000), None)
            .await
            .unwrap();

        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_facture.amount(), dec!(115000));
        assert_eq!(summary.solde.amount(), dec!(115000));

        service
            .record_payment(account.id, mga(115_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap();

        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_paye.amount(), dec!(115000));
        assert_eq!(summary.solde.amount(), dec!(0));
        assert_eq!(summary.status, AccountStatus::Solde);
    }

    #[tokio::test]
    async fn test_overpayment_is_permitted() {
        let service = service();
        let account = open_account(&service, 115_000).await;

        service
            .record_payment(account.id, mga(115_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap();
        service
            .record_payment(account.id, mga(5_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap();

        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_paye.amount(), dec!(120000));
        assert_eq!(summary.solde.amount(), dec!(-5000));
        assert_eq!(summary.status, AccountStatus::Solde);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let service = service();
        let account = open_account(&service, 50_000).await;

        let err = service
            .add_charge(account.id, ChargeType::Minibar, mga(0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidAmount(_)));

        let err = service
            .record_payment(account.id, mga(-100), PaymentMethod::Especes, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidAmount(_)));

        // Nothing was recorded
        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_facture.amount(), dec!(50000));
        assert_eq!(summary.total_paye.amount(), dec!(0));
    }

    #[tokio::test]
    async fn test_failed_append_leaves_no_durable_entry() {
        let port = Arc::new(MockFolioPort::new());
        let service = FolioService::new(port.clone());
        let account = open_account(&service, 300_000).await;

        port.fail_entry_writes(true).await;
        let err = service
            .add_charge(account.id, ChargeType::Minibar, mga(50_000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Storage(_)));
        let err = service
            .record_payment(account.id, mga(50_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Storage(_)));

        // Nothing durable, and the served totals still cover every
        // durable entry
        port.fail_entry_writes(false).await;
        let (charges, payments) = service.account_entries(account.id).await.unwrap();
        assert!(charges.is_empty());
        assert!(payments.is_empty());
        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.total_facture.amount(), dec!(300000));
        assert_eq!(summary.total_paye.amount(), dec!(0));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let service = service();
        let err = service
            .balance_summary(AccountId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let service = service();
        let reservation_id = ReservationId::new();
        let hotel_id = HotelId::new();
        let client_id = ClientId::new();

        let first = service
            .ensure_account(reservation_id, hotel_id, client_id, mga(100_000))
            .await
            .unwrap();
        let second = service
            .ensure_account(reservation_id, hotel_id, client_id, mga(100_000))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.total_facture.amount(), dec!(100000));
    }

    #[tokio::test]
    async fn test_dette_sticky_through_partial_payment() {
        let service = service();
        let account = open_account(&service, 80_000).await;

        service.flag_debt(account.id).await.unwrap();
        service
            .record_payment(account.id, mga(30_000), PaymentMethod::MobileMoney, None, None)
            .await
            .unwrap();

        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.status, AccountStatus::Dette);

        service
            .record_payment(account.id, mga(50_000), PaymentMethod::MobileMoney, None, None)
            .await
            .unwrap();
        let summary = service.balance_summary(account.id).await.unwrap();
        assert_eq!(summary.status, AccountStatus::Solde);
    }

    #[tokio::test]
    async fn test_client_debt_folds_positive_soldes() {
        let port = Arc::new(MockFolioPort::new());
        let service = FolioService::new(port);
        let client_id = ClientId::new();
        let hotel_id = HotelId::new();

        // Two stays with debt, one settled
        let a = service
            .ensure_account(ReservationId::new(), hotel_id, client_id, mga(60_000))
            .await
            .unwrap();
        let b = service
            .ensure_account(ReservationId::new(), hotel_id, client_id, mga(40_000))
            .await
            .unwrap();
        service
            .ensure_account(ReservationId::new(), hotel_id, client_id, mga(25_000))
            .await
            .map(|settled| settled.id)
            .unwrap();

        service
            .record_payment(a.id, mga(10_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap();
        // b untouched; third account fully paid
        let accounts = service
            .port
            .list_accounts_for_client(client_id)
            .await
            .unwrap();
        let settled = accounts
            .iter()
            .find(|acc| acc.id != a.id && acc.id != b.id)
            .unwrap();
        service
            .record_payment(settled.id, mga(25_000), PaymentMethod::Especes, None, None)
            .await
            .unwrap();

        let debt = service.client_debt(client_id, Currency::MGA).await.unwrap();
        assert_eq!(debt.amount(), dec!(90000)); // 50_000 + 40_000
    }
}
