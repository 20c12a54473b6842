//! PostgreSQL Folio Adapter
//!
//! Implements `FolioPort` over the `stay_accounts`, `charge_lines` and
//! `payments` tables. Lines and payments are append-only; ordering is by
//! the UUIDv7 primary key, which is creation-ordered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    AccountId, ChargeLineId, ClientId, DomainPort, HotelId, Money, PaymentId, PortError,
    ReservationId,
};
use domain_folio::{
    AccountStatus, ChargeLine, ChargeType, FolioPort, Payment, PaymentMethod, StayAccount,
};

use crate::adapters::{enum_from_row, enum_to_column, money_from_row};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the `FolioPort` trait
#[derive(Debug, Clone)]
pub struct PostgresFolioAdapter {
    pool: PgPool,
}

impl PostgresFolioAdapter {
    /// Creates a new PostgreSQL folio adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_account(
        &self,
        id: AccountId,
    ) -> Result<Option<StayAccount>, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, hotel_id, reservation_id, client_id, account_number,
                   initial_charge, total_facture, total_paye, status, currency,
                   created_at, updated_at
            FROM stay_accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StayAccount::try_from).transpose()
    }
}

impl DomainPort for PostgresFolioAdapter {}

#[async_trait]
impl FolioPort for PostgresFolioAdapter {
    #[instrument(skip(self))]
    async fn get_account(&self, id: AccountId) -> Result<StayAccount, PortError> {
        self.fetch_account(id)
            .await?
            .ok_or_else(|| PortError::not_found("StayAccount", id))
    }

    async fn find_account_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<StayAccount>, PortError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, hotel_id, reservation_id, client_id, account_number,
                   initial_charge, total_facture, total_paye, status, currency,
                   created_at, updated_at
            FROM stay_accounts
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(StayAccount::try_from).transpose()?)
    }

    #[instrument(skip(self, account))]
    async fn insert_account(&self, account: &StayAccount) -> Result<StayAccount, PortError> {
        // The unique index on reservation_id decides the race; the loser's
        // insert is a no-op and the winner's row is handed back.
        sqlx::query(
            r#"
            INSERT INTO stay_accounts (
                id, hotel_id, reservation_id, client_id, account_number,
                initial_charge, total_facture, total_paye, status, currency,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (reservation_id) DO NOTHING
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.hotel_id.as_uuid())
        .bind(account.reservation_id.as_uuid())
        .bind(account.client_id.as_uuid())
        .bind(&account.account_number)
        .bind(account.initial_charge.amount())
        .bind(account.total_facture.amount())
        .bind(account.total_paye.amount())
        .bind(enum_to_column(&account.status))
        .bind(account.currency.code())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        self.find_account_by_reservation(account.reservation_id)
            .await?
            .ok_or_else(|| PortError::internal("inserted account vanished"))
    }

    async fn update_account(&self, account: &StayAccount) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE stay_accounts
            SET total_facture = $1, total_paye = $2, status = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(account.total_facture.amount())
        .bind(account.total_paye.amount())
        .bind(enum_to_column(&account.status))
        .bind(account.updated_at)
        .bind(account.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("StayAccount", account.id));
        }
        Ok(())
    }

    #[instrument(skip(self, line))]
    async fn append_charge(&self, line: &ChargeLine) -> Result<StayAccount, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let account = lock_account(&mut tx, line.account_id).await?;
        sqlx::query(
            r#"
            INSERT INTO charge_lines (id, account_id, charge_type, amount, currency,
                                      description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.account_id.as_uuid())
        .bind(enum_to_column(&line.charge_type))
        .bind(line.amount.amount())
        .bind(line.amount.currency().code())
        .bind(&line.description)
        .bind(line.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let account = refold_account(&mut tx, account).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(account)
    }

    #[instrument(skip(self, payment))]
    async fn append_payment(&self, payment: &Payment) -> Result<StayAccount, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let account = lock_account(&mut tx, payment.account_id).await?;
        sqlx::query(
            r#"
            INSERT INTO payments (id, account_id, amount, currency, method,
                                  reference, remark, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.account_id.as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(enum_to_column(&payment.method))
        .bind(&payment.reference)
        .bind(&payment.remark)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let account = refold_account(&mut tx, account).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(account)
    }

    async fn list_charges(&self, account_id: AccountId) -> Result<Vec<ChargeLine>, PortError> {
        let rows = sqlx::query_as::<_, ChargeLineRow>(
            r#"
            SELECT id, account_id, charge_type, amount, currency, description, created_at
            FROM charge_lines
            WHERE account_id = $1
            ORDER BY id
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| Ok(ChargeLine::try_from(r)?))
            .collect()
    }

    async fn list_payments(&self, account_id: AccountId) -> Result<Vec<Payment>, PortError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, account_id, amount, currency, method, reference, remark, created_at
            FROM payments
            WHERE account_id = $1
            ORDER BY id
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| Ok(Payment::try_from(r)?)).collect()
    }

    async fn list_accounts_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<StayAccount>, PortError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, hotel_id, reservation_id, client_id, account_number,
                   initial_charge, total_facture, total_paye, status, currency,
                   created_at, updated_at
            FROM stay_accounts
            WHERE client_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| Ok(StayAccount::try_from(r)?))
            .collect()
    }
}

/// Locks the account row for the duration of the transaction, so
/// concurrent folds over the same account serialize instead of racing
/// each other's blind update.
async fn lock_account(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account_id: AccountId,
) -> Result<StayAccount, PortError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, hotel_id, reservation_id, client_id, account_number,
               initial_charge, total_facture, total_paye, status, currency,
               created_at, updated_at
        FROM stay_accounts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(account_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    let account = row
        .map(StayAccount::try_from)
        .transpose()?
        .ok_or_else(|| PortError::not_found("StayAccount", account_id))?;
    Ok(account)
}

/// Refolds the durable entry sets into fresh totals with SQL aggregates
/// and persists them, all inside the caller's transaction.
async fn refold_account(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    mut account: StayAccount,
) -> Result<StayAccount, PortError> {
    let charges_sum: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM charge_lines WHERE account_id = $1",
    )
    .bind(account.id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    let paye_sum: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE account_id = $1",
    )
    .bind(account.id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    let total_facture = Money::new(account.initial_charge.amount() + charges_sum, account.currency);
    let total_paye = Money::new(paye_sum, account.currency);
    account.apply_totals(total_facture, total_paye);

    sqlx::query(
        r#"
        UPDATE stay_accounts
        SET total_facture = $1, total_paye = $2, status = $3, updated_at = $4
        WHERE id = $5
        "#,
    )
    .bind(account.total_facture.amount())
    .bind(account.total_paye.amount())
    .bind(enum_to_column(&account.status))
    .bind(account.updated_at)
    .bind(account.id.as_uuid())
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    Ok(account)
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    hotel_id: Uuid,
    reservation_id: Uuid,
    client_id: Uuid,
    account_number: String,
    initial_charge: Decimal,
    total_facture: Decimal,
    total_paye: Decimal,
    status: String,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for StayAccount {
    type Error = DatabaseError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let status: AccountStatus = enum_from_row("status", &row.status)?;
        let currency = std::str::FromStr::from_str(&row.currency)
            .map_err(|e: core_kernel::MoneyError| DatabaseError::CorruptRow(e.to_string()))?;
        Ok(StayAccount {
            id: AccountId::from_uuid(row.id),
            hotel_id: HotelId::from_uuid(row.hotel_id),
            reservation_id: ReservationId::from_uuid(row.reservation_id),
            client_id: ClientId::from_uuid(row.client_id),
            account_number: row.account_number,
            initial_charge: money_from_row(row.initial_charge, &row.currency)?,
            total_facture: money_from_row(row.total_facture, &row.currency)?,
            total_paye: money_from_row(row.total_paye, &row.currency)?,
            status,
            currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ChargeLineRow {
    id: Uuid,
    account_id: Uuid,
    charge_type: String,
    amount: Decimal,
    currency: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChargeLineRow> for ChargeLine {
    type Error = DatabaseError;

    fn try_from(row: ChargeLineRow) -> Result<Self, Self::Error> {
        let charge_type: ChargeType = enum_from_row("charge_type", &row.charge_type)?;
        Ok(ChargeLine {
            id: ChargeLineId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            charge_type,
            amount: money_from_row(row.amount, &row.currency)?,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    account_id: Uuid,
    amount: Decimal,
    currency: String,
    method: String,
    reference: Option<String>,
    remark: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let method: PaymentMethod = enum_from_row("method", &row.method)?;
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            amount: money_from_row(row.amount, &row.currency)?,
            method,
            reference: row.reference,
            remark: row.remark,
            created_at: row.created_at,
        })
    }
}
