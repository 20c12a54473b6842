//! Folio Domain Ports
//!
//! The `FolioPort` trait defines everything the ledger needs from its data
//! store. The PostgreSQL adapter lives in `infra_db`; an in-memory mock is
//! provided here for unit testing.
//!
//! The store must keep lines and payments in insertion order and must make
//! `insert_account` idempotent per reservation (first writer wins, later
//! writers receive the existing row) — that is what makes lazy
//! first-payment-creates-account safe under concurrency.
//!
//! Appending an entry and persisting the refolded totals is one atomic
//! store operation: either the entry is durable and the account totals
//! cover it, or nothing is written. A split append would let a failed
//! totals write strand a durable entry behind stale stored figures.

use async_trait::async_trait;

use core_kernel::{AccountId, ClientId, DomainPort, PortError, ReservationId};

use crate::account::StayAccount;
use crate::charge::ChargeLine;
use crate::payment::Payment;

/// Port trait for folio persistence
#[async_trait]
pub trait FolioPort: DomainPort {
    /// Retrieves an account by ID
    async fn get_account(&self, id: AccountId) -> Result<StayAccount, PortError>;

    /// Finds the account bound to a reservation, if any
    async fn find_account_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<StayAccount>, PortError>;

    /// Inserts a new account
    ///
    /// Idempotent per reservation: if an account already exists for the
    /// reservation (including one created by a concurrent caller), the
    /// existing row is returned and nothing is written.
    async fn insert_account(&self, account: &StayAccount) -> Result<StayAccount, PortError>;

    /// Persists status and totals; used for the explicit debt flag, the
    /// append paths carry their own totals write
    async fn update_account(&self, account: &StayAccount) -> Result<(), PortError>;

    /// Appends a consumption line (append-only, never updated) and
    /// persists the refolded totals atomically, returning the refreshed
    /// account
    async fn append_charge(&self, line: &ChargeLine) -> Result<StayAccount, PortError>;

    /// Appends a payment (append-only, never updated) and persists the
    /// refolded totals atomically, returning the refreshed account
    async fn append_payment(&self, payment: &Payment) -> Result<StayAccount, PortError>;

    /// All lines of an account, in insertion order
    async fn list_charges(&self, account_id: AccountId) -> Result<Vec<ChargeLine>, PortError>;

    /// All payments of an account, in insertion order
    async fn list_payments(&self, account_id: AccountId) -> Result<Vec<Payment>, PortError>;

    /// All accounts belonging to a client, for the derived debt aggregate
    async fn list_accounts_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<StayAccount>, PortError>;
}

/// In-memory mock adapter for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::Money;

    /// In-memory implementation of `FolioPort`
    #[derive(Debug, Default)]
    pub struct MockFolioPort {
        accounts: Arc<RwLock<HashMap<AccountId, StayAccount>>>,
        by_reservation: Arc<RwLock<HashMap<ReservationId, AccountId>>>,
        charges: Arc<RwLock<HashMap<AccountId, Vec<ChargeLine>>>>,
        payments: Arc<RwLock<HashMap<AccountId, Vec<Payment>>>>,
        fail_entry_writes: Arc<RwLock<bool>>,
    }

    impl MockFolioPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent charge/payment append fail, for
        /// exercising the callers' error paths
        pub async fn fail_entry_writes(&self, fail: bool) {
            *self.fail_entry_writes.write().await = fail;
        }
    }

    /// Folds the entry sets into fresh totals on the stored account
    fn refold(account: &mut StayAccount, charges: &[ChargeLine], payments: &[Payment]) {
        let total_facture = charges
            .iter()
            .fold(account.initial_charge, |acc, l| acc + l.amount);
        let total_paye = payments
            .iter()
            .fold(Money::zero(account.currency), |acc, p| acc + p.amount);
        account.apply_totals(total_facture, total_paye);
    }

    impl DomainPort for MockFolioPort {}

    #[async_trait]
    impl FolioPort for MockFolioPort {
        async fn get_account(&self, id: AccountId) -> Result<StayAccount, PortError> {
            self.accounts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("StayAccount", id))
        }

        async fn find_account_by_reservation(
            &self,
            reservation_id: ReservationId,
        ) -> Result<Option<StayAccount>, PortError> {
            let by_reservation = self.by_reservation.read().await;
            let accounts = self.accounts.read().await;
            Ok(by_reservation
                .get(&reservation_id)
                .and_then(|id| accounts.get(id))
                .cloned())
        }

        async fn insert_account(&self, account: &StayAccount) -> Result<StayAccount, PortError> {
            let mut by_reservation = self.by_reservation.write().await;
            let mut accounts = self.accounts.write().await;

            if let Some(existing_id) = by_reservation.get(&account.reservation_id) {
                // First writer won; hand back its row
                return Ok(accounts
                    .get(existing_id)
                    .cloned()
                    .expect("reservation index points at a live account"));
            }

            by_reservation.insert(account.reservation_id, account.id);
            accounts.insert(account.id, account.clone());
            Ok(account.clone())
        }

        async fn update_account(&self, account: &StayAccount) -> Result<(), PortError> {
            let mut accounts = self.accounts.write().await;
            match accounts.get_mut(&account.id) {
                Some(existing) => {
                    *existing = account.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("StayAccount", account.id)),
            }
        }

        async fn append_charge(&self, line: &ChargeLine) -> Result<StayAccount, PortError> {
            if *self.fail_entry_writes.read().await {
                return Err(PortError::connection("simulated write failure"));
            }
            // All locks held across the append and the refold, so the two
            // writes land together or not at all
            let mut accounts = self.accounts.write().await;
            let mut charges = self.charges.write().await;
            let payments = self.payments.read().await;

            let account = accounts
                .get_mut(&line.account_id)
                .ok_or_else(|| PortError::not_found("StayAccount", line.account_id))?;
            charges.entry(line.account_id).or_default().push(line.clone());

            refold(
                account,
                charges.get(&line.account_id).map(Vec::as_slice).unwrap_or(&[]),
                payments.get(&line.account_id).map(Vec::as_slice).unwrap_or(&[]),
            );
            Ok(account.clone())
        }

        async fn append_payment(&self, payment: &Payment) -> Result<StayAccount, PortError> {
            if *self.fail_entry_writes.read().await {
                return Err(PortError::connection("simulated write failure"));
            }
            let mut accounts = self.accounts.write().await;
            let charges = self.charges.read().await;
            let mut payments = self.payments.write().await;

            let account = accounts
                .get_mut(&payment.account_id)
                .ok_or_else(|| PortError::not_found("StayAccount", payment.account_id))?;
            payments
                .entry(payment.account_id)
                .or_default()
                .push(payment.clone());

            refold(
                account,
                charges.get(&payment.account_id).map(Vec::as_slice).unwrap_or(&[]),
                payments.get(&payment.account_id).map(Vec::as_slice).unwrap_or(&[]),
            );
            Ok(account.clone())
        }

        async fn list_charges(&self, account_id: AccountId) -> Result<Vec<ChargeLine>, PortError> {
            Ok(self
                .charges
                .read()
                .await
                .get(&account_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn list_payments(&self, account_id: AccountId) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .payments
                .read()
                .await
                .get(&account_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn list_accounts_for_client(
            &self,
            client_id: ClientId,
        ) -> Result<Vec<StayAccount>, PortError> {
            Ok(self
                .accounts
                .read()
                .await
                .values()
                .filter(|a| a.client_id == client_id)
                .cloned()
                .collect())
        }
    }
}
