//! Balance, withdrawal and withdrawal history routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use loyalty_core::ledger::{Balance, Withdrawal};
use loyalty_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::AuthUser;

/// Creates the balance router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(balance))
        .route("/balance/withdraw", post(withdraw))
        .route("/withdrawals", get(withdrawals))
}

/// `GET /api/user/balance` body.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Spendable points.
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    /// Points withdrawn so far.
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self {
            current: balance.current,
            withdrawn: balance.withdrawn,
        }
    }
}

/// `POST /api/user/balance/withdraw` body.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Order number the points are spent on.
    pub order: String,
    /// Points to spend.
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

/// One entry of `GET /api/user/withdrawals`.
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    /// Order number.
    pub order: String,
    /// Points spent.
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    /// When the withdrawal was recorded (RFC 3339).
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            order: withdrawal.order_number.into_inner(),
            sum: withdrawal.sum,
            processed_at: withdrawal.processed_at,
        }
    }
}

/// GET /api/user/balance
async fn balance(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.ledger.balance(user.user_id()).await?;
    Ok(Json(balance.into()))
}

/// POST /api/user/balance/withdraw
///
/// 402 when the balance is too low, 422 for a bad order number or sum.
async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    state
        .ledger
        .withdraw(user.user_id(), &request.order, request.sum)
        .await?;

    Ok(StatusCode::OK)
}

/// GET /api/user/withdrawals - Newest first. 204 when empty.
async fn withdrawals(State(state): State<AppState>, user: AuthUser) -> ApiResult<Response> {
    let withdrawals = state.ledger.withdrawals(user.user_id()).await?;
    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<WithdrawalResponse> = withdrawals
        .into_iter()
        .map(WithdrawalResponse::from)
        .collect();
    Ok(Json(body).into_response())
}
