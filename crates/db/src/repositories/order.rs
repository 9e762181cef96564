//! Postgres-backed [`OrderStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loyalty_core::StoreError;
use loyalty_core::order::{
    InsertOrder, NewOrder, Order, OrderNumber, OrderStatus, OrderStore, SettleOutcome, Settlement,
};
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;

use super::convert::{self, db_err};
use crate::entities::{balances, orders};

const OPEN_STATUSES: [&str; 2] = [OrderStatus::New.as_str(), OrderStatus::Processing.as_str()];

/// Order store over the `orders` table.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: DatabaseConnection,
}

impl PgOrderStore {
    /// Creates a new order store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        orders::Entity::find()
            .filter(orders::Column::Number.eq(number.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(convert::order)
            .transpose()
    }

    async fn insert(&self, order: NewOrder) -> Result<InsertOrder, StoreError> {
        let at = order.uploaded_at.into();
        let inserted = orders::Entity::insert(orders::ActiveModel {
            id: Set(order.id.into_inner()),
            user_id: Set(order.user_id.into_inner()),
            number: Set(order.number.as_str().to_string()),
            status: Set(OrderStatus::New.as_str().to_string()),
            accrual: Set(None),
            uploaded_at: Set(at),
            updated_at: Set(at),
        })
        .on_conflict(OnConflict::column(orders::Column::Number).do_nothing().to_owned())
        .exec_without_returning(&self.db)
        .await
        .map_err(db_err)?;

        if inserted > 0 {
            return Ok(InsertOrder::Created(order.into_order()));
        }

        debug!(order = %order.number, "Order number already claimed");
        self.find_by_number(&order.number)
            .await?
            .map(InsertOrder::Existing)
            .ok_or_else(|| StoreError::Corrupt(format!("order {} vanished after conflict", order.number)))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id.into_inner()))
            .order_by_desc(orders::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        convert::order_list(rows)
    }

    async fn list_open(&self) -> Result<Vec<Order>, StoreError> {
        let rows = orders::Entity::find()
            .filter(orders::Column::Status.is_in(OPEN_STATUSES))
            .order_by_asc(orders::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        convert::order_list(rows)
    }

    async fn mark_processing(
        &self,
        number: &OrderNumber,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(OrderStatus::Processing.as_str()),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(at))
            .filter(orders::Column::Number.eq(number.as_str()))
            .filter(orders::Column::Status.eq(OrderStatus::New.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn settle(
        &self,
        number: &OrderNumber,
        settlement: Settlement,
        at: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let Some(row) = orders::Entity::find()
            .filter(orders::Column::Number.eq(number.as_str()))
            .filter(orders::Column::Status.is_in(OPEN_STATUSES))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(SettleOutcome::AlreadyTerminal);
        };

        let (status, accrual, credit) = match settlement {
            Settlement::Processed { accrual } => (OrderStatus::Processed, Some(accrual), accrual),
            Settlement::Invalid => (OrderStatus::Invalid, None, Decimal::ZERO),
        };

        let updated = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(status.as_str()))
            .col_expr(orders::Column::Accrual, Expr::value(accrual))
            .col_expr(orders::Column::UpdatedAt, Expr::value(at))
            .filter(orders::Column::Id.eq(row.id))
            .filter(orders::Column::Status.is_in(OPEN_STATUSES))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if updated.rows_affected == 0 {
            return Ok(SettleOutcome::AlreadyTerminal);
        }

        if credit > Decimal::ZERO {
            let credited = balances::Entity::update_many()
                .col_expr(
                    balances::Column::Current,
                    Expr::col(balances::Column::Current).add(credit),
                )
                .col_expr(balances::Column::UpdatedAt, Expr::value(at))
                .filter(balances::Column::UserId.eq(row.user_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;

            if credited.rows_affected != 1 {
                return Err(StoreError::Corrupt(format!(
                    "no balance row for user {}",
                    row.user_id
                )));
            }
        }

        txn.commit().await.map_err(db_err)?;

        Ok(SettleOutcome::Applied { credited: credit })
    }
}
