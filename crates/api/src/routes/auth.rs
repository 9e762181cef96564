//! Registration and login routes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use loyalty_core::auth::UserRecord;
use loyalty_shared::AppError;
use loyalty_shared::auth::{AuthResponse, CredentialsRequest};
use tracing::error;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Unwraps the JSON body; any decoding failure is a plain 400.
fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.is_complete() {
        Ok(request)
    } else {
        Err(AppError::Validation("login and password are required".to_string()))
    }
}

/// Issues a token and returns it both in the header and the body.
fn signed_in(state: &AppState, user: &UserRecord) -> ApiResult<Response> {
    let token = state.jwt_service.issue(user.id, &user.login).map_err(|e| {
        error!(error = %e, "Failed to issue access token");
        AppError::Internal("failed to issue access token".to_string())
    })?;

    let header = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let body = AuthResponse {
        id: user.id.into_inner(),
        login: user.login.clone(),
        access_token: token,
        expires_in: state.jwt_service.expires_in(),
    };

    Ok(([(AUTHORIZATION, header)], Json(body)).into_response())
}

/// POST /api/user/register - Create an account and sign in.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = credentials(payload)?;
    let user = state.auth.register(&request.login, &request.password).await?;
    signed_in(&state, &user)
}

/// POST /api/user/login - Authenticate and return a token.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = credentials(payload)?;
    let user = state
        .auth
        .authenticate(&request.login, &request.password)
        .await?;
    signed_in(&state, &user)
}
