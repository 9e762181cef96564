//! Persistence contract for balances and withdrawals.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;

use super::types::{Balance, NewWithdrawal, Withdrawal};
use crate::store::StoreError;

/// Result of [`LedgerStore::debit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Balance debited and withdrawal recorded.
    Applied {
        /// Balance after the debit.
        balance: Balance,
        /// The recorded withdrawal.
        withdrawal: Withdrawal,
    },
    /// `current` was below the requested sum; nothing changed.
    InsufficientFunds {
        /// Spendable points at the time of the check.
        available: Decimal,
    },
    /// The user has no balance row.
    BalanceNotFound,
}

/// Balance and withdrawal persistence.
///
/// Mutations for one user are serialized by the implementation (a row lock
/// inside a transaction for the Postgres store).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns the user's balance, if the row exists.
    async fn balance(&self, user_id: UserId) -> Result<Option<Balance>, StoreError>;

    /// Adds `amount` to `current`. Returns the new balance, or `None` without a row.
    async fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Option<Balance>, StoreError>;

    /// Check-and-debit as one atomic step.
    async fn debit(&self, withdrawal: NewWithdrawal) -> Result<DebitOutcome, StoreError>;

    /// Returns the user's withdrawals, newest first.
    async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError>;
}
