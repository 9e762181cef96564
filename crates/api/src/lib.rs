//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The `/api/user/*` routes
//! - Authentication middleware and the `AuthUser` extractor
//! - Mapping of domain errors onto HTTP responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use loyalty_core::auth::AuthService;
use loyalty_core::ledger::LedgerService;
use loyalty_core::order::OrderService;
use loyalty_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Registration and login.
    pub auth: Arc<AuthService>,
    /// Order admission.
    pub orders: Arc<OrderService>,
    /// Balance and withdrawals.
    pub ledger: Arc<LedgerService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/user", routes::user_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
