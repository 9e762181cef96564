//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod balance;
pub mod health;
pub mod orders;

/// Creates the `/api/user` router.
///
/// Register and login are public; everything else needs a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn user_routes(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(orders::routes())
        .merge(balance::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(auth::routes()).merge(protected_routes)
}
