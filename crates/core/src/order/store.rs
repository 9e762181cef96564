//! Persistence contract for orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;

use super::number::OrderNumber;
use super::types::{NewOrder, Order};
use crate::store::StoreError;

/// Result of [`OrderStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrder {
    /// The row was created.
    Created(Order),
    /// The number was already taken; carries the row that owns it.
    Existing(Order),
}

/// Final verdict applied to an open order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Scored; `accrual` is credited to the owner when positive.
    Processed {
        /// Points granted.
        accrual: Decimal,
    },
    /// Rejected; nothing is credited.
    Invalid,
}

/// Result of [`OrderStore::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The order moved to its terminal state; `credited` points were added.
    Applied {
        /// Amount added to the owner's balance (zero for `Invalid`).
        credited: Decimal,
    },
    /// The order was already terminal or missing; nothing changed.
    AlreadyTerminal,
}

/// Order persistence.
///
/// Each method is atomic on its own.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up an order by number.
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError>;

    /// Inserts a `NEW` order unless the number is taken.
    ///
    /// A concurrent insert of the same number must resolve to `Existing` with the
    /// winning row rather than an error.
    async fn insert(&self, order: NewOrder) -> Result<InsertOrder, StoreError>;

    /// Returns the user's orders, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Returns every order in `NEW` or `PROCESSING`.
    async fn list_open(&self) -> Result<Vec<Order>, StoreError>;

    /// Moves a `NEW` order to `PROCESSING`, stamped `at`. Returns whether a row changed.
    async fn mark_processing(
        &self,
        number: &OrderNumber,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Applies a terminal status and credits the owner in one transaction.
    ///
    /// The update is guarded by `status IN (NEW, PROCESSING)`, so a second call for
    /// the same order returns `AlreadyTerminal` and credits nothing.
    async fn settle(
        &self,
        number: &OrderNumber,
        settlement: Settlement,
        at: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError>;
}
