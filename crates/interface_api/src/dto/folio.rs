//! Folio ledger DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_folio::{BalanceSummary, ChargeLine, Payment, StayAccount};

#[derive(Debug, Deserialize, Validate)]
pub struct AddChargeRequest {
    pub charge_type: String,
    pub amount: Decimal,
    pub currency: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: String,
    pub total_facture: Decimal,
    pub total_paye: Decimal,
    pub solde: Decimal,
    pub status: String,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            account_id: summary.account_id.to_string(),
            total_facture: summary.total_facture.amount(),
            total_paye: summary.total_paye.amount(),
            solde: summary.solde.amount(),
            status: format!("{:?}", summary.status).to_lowercase(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub account_number: String,
    pub reservation_id: String,
    pub client_id: String,
    pub currency: String,
    pub balance: BalanceResponse,
    pub created_at: DateTime<Utc>,
}

impl From<StayAccount> for AccountResponse {
    fn from(account: StayAccount) -> Self {
        let balance = BalanceResponse::from(account.summary());
        Self {
            id: account.id.to_string(),
            account_number: account.account_number.clone(),
            reservation_id: account.reservation_id.to_string(),
            client_id: account.client_id.to_string(),
            currency: account.currency.code().to_string(),
            balance,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChargeLineResponse {
    pub id: String,
    pub charge_type: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChargeLine> for ChargeLineResponse {
    fn from(line: ChargeLine) -> Self {
        Self {
            id: line.id.to_string(),
            charge_type: line.charge_type.label().to_string(),
            amount: line.amount.amount(),
            description: line.description,
            created_at: line.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            amount: payment.amount.amount(),
            method: format!("{:?}", payment.method).to_lowercase(),
            reference: payment.reference,
            created_at: payment.created_at,
        }
    }
}

/// Full account view: header plus the ordered entry history
#[derive(Debug, Serialize)]
pub struct AccountDetailResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub charges: Vec<ChargeLineResponse>,
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct DebtQuery {
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientDebtResponse {
    pub client_id: String,
    pub currency: String,
    pub argent_du: Decimal,
}
