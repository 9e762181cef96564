//! Loyalty ledger server.
//!
//! Serves the HTTP API and runs the accrual reconciliation loop until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loyalty_accrual::HttpAccrualGateway;
use loyalty_api::{AppState, create_router};
use loyalty_core::SystemClock;
use loyalty_core::auth::AuthService;
use loyalty_core::ledger::LedgerService;
use loyalty_core::order::OrderService;
use loyalty_core::reconcile::{EngineConfig, ReconciliationEngine};
use loyalty_db::{Migrator, PgLedgerStore, PgOrderStore, UserRepository, connect_with};
use loyalty_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loyalty=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)
            .context("jwt.access_token_expiry_secs is too large")?,
    });

    let clock = Arc::new(SystemClock);
    let orders = Arc::new(PgOrderStore::new(db.clone()));
    let ledger = Arc::new(PgLedgerStore::new(db.clone()));
    let users = Arc::new(UserRepository::new(db));

    let gateway = HttpAccrualGateway::new((&config.accrual).into())
        .context("failed to build accrual client")?;
    let engine = ReconciliationEngine::new(
        orders.clone(),
        Arc::new(gateway),
        clock.clone(),
        EngineConfig::from(&config.accrual),
    );

    let shutdown = CancellationToken::new();
    let reconciler = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { engine.run(shutdown).await }
    });

    let state = AppState {
        jwt_service: Arc::new(jwt_service),
        auth: Arc::new(AuthService::new(users)),
        orders: Arc::new(OrderService::new(orders, clock.clone())),
        ledger: Arc::new(LedgerService::new(ledger, clock)),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.address).await?;
    info!("Server listening on {}", config.server.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, waiting for reconciliation loop");
    shutdown.cancel();
    reconciler.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
