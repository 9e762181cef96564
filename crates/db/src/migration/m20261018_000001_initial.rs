//! Initial schema: users, balances, orders, withdrawals.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS withdrawals, orders, balances, users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    login VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_users_login UNIQUE (login)
);

-- One row per user, created with the user
CREATE TABLE balances (
    user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    current NUMERIC(19, 4) NOT NULL DEFAULT 0,
    withdrawn NUMERIC(19, 4) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balances_current_non_negative CHECK (current >= 0),
    CONSTRAINT chk_balances_withdrawn_non_negative CHECK (withdrawn >= 0)
);

CREATE TABLE orders (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    number VARCHAR(64) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'NEW',
    accrual NUMERIC(19, 4),
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_orders_number UNIQUE (number),
    CONSTRAINT chk_orders_status CHECK (status IN ('NEW', 'PROCESSING', 'INVALID', 'PROCESSED')),
    CONSTRAINT chk_orders_accrual CHECK (accrual IS NULL OR (status = 'PROCESSED' AND accrual >= 0))
);

-- User order history, newest first
CREATE INDEX idx_orders_user ON orders(user_id, uploaded_at DESC);

-- Reconciliation scan
CREATE INDEX idx_orders_open ON orders(uploaded_at) WHERE status IN ('NEW', 'PROCESSING');

-- Append-only
CREATE TABLE withdrawals (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    order_number VARCHAR(64) NOT NULL,
    sum NUMERIC(19, 4) NOT NULL,
    processed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_withdrawals_sum_positive CHECK (sum > 0)
);

CREATE INDEX idx_withdrawals_user ON withdrawals(user_id, processed_at DESC);
";
