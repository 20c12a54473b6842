//! Billing ledger handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{AccountId, ClientId, Currency, Money, ReservationId};
use domain_folio::{ChargeType, PaymentMethod, StayAccount};

use crate::auth::{permissions, Claims};
use crate::dto::folio::*;
use crate::error::ApiError;
use crate::handlers::{check_hotel_scope, hotel_from_claims, parse_enum, require_permission};
use crate::AppState;

fn currency_from_request(code: &str) -> Result<Currency, ApiError> {
    code.parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown currency '{}'", code)))
}

async fn account_detail(
    state: &AppState,
    account: StayAccount,
) -> Result<AccountDetailResponse, ApiError> {
    let (charges, payments) = state.folio.account_entries(account.id).await?;
    Ok(AccountDetailResponse {
        account: account.into(),
        charges: charges.into_iter().map(Into::into).collect(),
        payments: payments.into_iter().map(Into::into).collect(),
    })
}

/// Gets an account with its full entry history
pub async fn get_account(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountDetailResponse>, ApiError> {
    require_permission(&claims, permissions::FOLIO_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let account = state.folio.account(AccountId::from_uuid(id)).await?;
    check_hotel_scope(hotel_id, account.hotel_id, "account")?;
    let detail = account_detail(&state, account).await?;
    Ok(Json(detail))
}

/// Gets the account attached to a reservation
///
/// 404 until check-in opens the account.
pub async fn get_account_for_reservation(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountDetailResponse>, ApiError> {
    require_permission(&claims, permissions::FOLIO_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;
    let account = state
        .folio
        .account_for_reservation(ReservationId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("no account opened for this reservation".to_string()))?;
    check_hotel_scope(hotel_id, account.hotel_id, "account")?;
    let detail = account_detail(&state, account).await?;
    Ok(Json(detail))
}

/// Appends a consumption line to an account
pub async fn add_charge(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddChargeRequest>,
) -> Result<(StatusCode, Json<BalanceResponse>), ApiError> {
    require_permission(&claims, permissions::FOLIO_CHARGE)?;
    request.validate()?;

    let hotel_id = hotel_from_claims(&claims)?;
    let charge_type: ChargeType = parse_enum("charge_type", &request.charge_type)?;
    let amount = Money::new(request.amount, currency_from_request(&request.currency)?);
    let account_id = AccountId::from_uuid(id);
    let account = state.folio.account(account_id).await?;
    check_hotel_scope(hotel_id, account.hotel_id, "account")?;

    state
        .folio
        .add_charge(account_id, charge_type, amount, request.description)
        .await?;
    let summary = state.folio.balance_summary(account_id).await?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

/// Records a payment against an account
pub async fn record_payment(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<BalanceResponse>), ApiError> {
    require_permission(&claims, permissions::FOLIO_ENCAISSER)?;
    request.validate()?;

    let hotel_id = hotel_from_claims(&claims)?;
    let method: PaymentMethod = parse_enum("method", &request.method)?;
    let amount = Money::new(request.amount, currency_from_request(&request.currency)?);
    let account_id = AccountId::from_uuid(id);
    let account = state.folio.account(account_id).await?;
    check_hotel_scope(hotel_id, account.hotel_id, "account")?;

    state
        .folio
        .record_payment(account_id, amount, method, request.reference, request.remark)
        .await?;
    let summary = state.folio.balance_summary(account_id).await?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

/// Derived outstanding debt for a guest across their stay accounts
pub async fn get_client_debt(
    State(state): State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(query): Query<DebtQuery>,
) -> Result<Json<ClientDebtResponse>, ApiError> {
    require_permission(&claims, permissions::FOLIO_READ)?;
    let hotel_id = hotel_from_claims(&claims)?;

    let currency = match query.currency.as_deref() {
        Some(code) => currency_from_request(code)?,
        None => Currency::MGA,
    };
    let client_id = ClientId::from_uuid(id);
    let client = state.stay.get_client(client_id).await?;
    check_hotel_scope(hotel_id, client.hotel_id, "client")?;
    let debt = state.folio.client_debt(client_id, currency).await?;

    Ok(Json(ClientDebtResponse {
        client_id: client_id.to_string(),
        currency: currency.code().to_string(),
        argent_du: debt.amount(),
    }))
}
