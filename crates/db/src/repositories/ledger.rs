//! Postgres-backed [`LedgerStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loyalty_core::StoreError;
use loyalty_core::ledger::{Balance, DebitOutcome, LedgerStore, NewWithdrawal, Withdrawal};
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::convert::{self, db_err};
use crate::entities::{balances, withdrawals};

/// Ledger store over the `balances` and `withdrawals` tables.
///
/// Debits take a `SELECT ... FOR UPDATE` lock on the user's balance row, so
/// concurrent withdrawals for one user are serialized by Postgres.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn balance(&self, user_id: UserId) -> Result<Option<Balance>, StoreError> {
        Ok(balances::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(convert::balance))
    }

    async fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Option<Balance>, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let result = balances::Entity::update_many()
            .col_expr(
                balances::Column::Current,
                Expr::col(balances::Column::Current).add(amount),
            )
            .col_expr(balances::Column::UpdatedAt, Expr::value(at))
            .filter(balances::Column::UserId.eq(user_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        let balance = balances::Entity::find_by_id(user_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_err)?
            .map(convert::balance);

        txn.commit().await.map_err(db_err)?;
        Ok(balance)
    }

    async fn debit(&self, request: NewWithdrawal) -> Result<DebitOutcome, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let Some(row) = balances::Entity::find_by_id(request.user_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(DebitOutcome::BalanceNotFound);
        };

        if row.current < request.sum {
            return Ok(DebitOutcome::InsufficientFunds {
                available: row.current,
            });
        }

        let at = request.processed_at.into();
        let mut active = row.clone().into_active_model();
        active.current = Set(row.current - request.sum);
        active.withdrawn = Set(row.withdrawn + request.sum);
        active.updated_at = Set(at);
        let updated = active.update(&txn).await.map_err(db_err)?;

        withdrawals::Entity::insert(withdrawals::ActiveModel {
            id: Set(request.id.into_inner()),
            user_id: Set(request.user_id.into_inner()),
            order_number: Set(request.order_number.as_str().to_string()),
            sum: Set(request.sum),
            processed_at: Set(at),
        })
        .exec_without_returning(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(DebitOutcome::Applied {
            balance: convert::balance(updated),
            withdrawal: request.into_withdrawal(),
        })
    }

    async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError> {
        withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id.into_inner()))
            .order_by_desc(withdrawals::Column::ProcessedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(convert::withdrawal)
            .collect()
    }
}
