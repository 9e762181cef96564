//! Order upload and listing routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use loyalty_core::order::{Order, OrderStatus, Submission};
use loyalty_shared::AppError;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::AuthUser;

/// Creates the orders router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/orders", post(upload).get(list))
}

/// One entry of `GET /api/user/orders`.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order number.
    pub number: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Points granted, once processed.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accrual: Option<Decimal>,
    /// Upload time (RFC 3339).
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number.into_inner(),
            status: order.status,
            accrual: order.accrual,
            uploaded_at: order.uploaded_at,
        }
    }
}

/// POST /api/user/orders - Upload an order number (plain-text body).
///
/// 202 for a new order, 200 if the caller already uploaded it.
async fn upload(State(state): State<AppState>, user: AuthUser, body: String) -> ApiResult<StatusCode> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("order number is required".to_string()).into());
    }

    match state.orders.submit(user.user_id(), &body).await? {
        Submission::Accepted(_) => Ok(StatusCode::ACCEPTED),
        Submission::AlreadyUploadedBySelf(_) => Ok(StatusCode::OK),
    }
}

/// GET /api/user/orders - The caller's orders, newest first. 204 when empty.
async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Response> {
    let orders = state.orders.list(user.user_id()).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(body).into_response())
}
