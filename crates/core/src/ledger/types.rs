//! Ledger domain types.

use chrono::{DateTime, Utc};
use loyalty_shared::types::{UserId, WithdrawalId};
use rust_decimal::Decimal;

use crate::order::OrderNumber;

/// Decimal places kept for point amounts (`NUMERIC(19, 4)`).
pub const POINTS_SCALE: u32 = 4;

/// A user's points balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Owner.
    pub user_id: UserId,
    /// Spendable points. Never negative.
    pub current: Decimal,
    /// Total points ever withdrawn.
    pub withdrawn: Decimal,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Opening balance for a freshly registered user.
    #[must_use]
    pub const fn empty(user_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
            updated_at: at,
        }
    }
}

/// A recorded withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Surrogate key.
    pub id: WithdrawalId,
    /// User whose balance was debited.
    pub user_id: UserId,
    /// Order the points were spent on.
    pub order_number: OrderNumber,
    /// Points debited.
    pub sum: Decimal,
    /// When the debit was committed.
    pub processed_at: DateTime<Utc>,
}

/// Input for a debit.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    /// Surrogate key for the withdrawal row.
    pub id: WithdrawalId,
    /// User to debit.
    pub user_id: UserId,
    /// Order the points are spent on.
    pub order_number: OrderNumber,
    /// Positive amount.
    pub sum: Decimal,
    /// Debit time.
    pub processed_at: DateTime<Utc>,
}

impl NewWithdrawal {
    /// Materialises the withdrawal as it is recorded.
    #[must_use]
    pub fn into_withdrawal(self) -> Withdrawal {
        Withdrawal {
            id: self.id,
            user_id: self.user_id,
            order_number: self.order_number,
            sum: self.sum,
            processed_at: self.processed_at,
        }
    }
}
