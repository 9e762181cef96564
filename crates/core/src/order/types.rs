//! Order domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use loyalty_shared::types::{OrderId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::number::OrderNumber;

/// Lifecycle state of an order.
///
/// Transitions only move forward: `New → Processing → {Processed | Invalid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Uploaded, not yet seen by the accrual authority.
    New,
    /// The accrual authority is still scoring the order.
    Processing,
    /// Rejected by the accrual authority. Terminal.
    Invalid,
    /// Scored and credited. Terminal.
    Processed,
}

impl OrderStatus {
    /// Returns the persisted/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }

    /// Returns true if no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// Returns true if the reconciliation engine should still poll this order.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a persisted status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Surrogate key.
    pub id: OrderId,
    /// Owner, fixed at creation.
    pub user_id: UserId,
    /// Globally unique order number.
    pub number: OrderNumber,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Points granted; only present once `Processed`.
    pub accrual: Option<Decimal>,
    /// When the order was first submitted.
    pub uploaded_at: DateTime<Utc>,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Surrogate key for the new row.
    pub id: OrderId,
    /// Submitting user.
    pub user_id: UserId,
    /// Validated number.
    pub number: OrderNumber,
    /// Submission time.
    pub uploaded_at: DateTime<Utc>,
}

impl NewOrder {
    /// Creates a `NEW` order input with a fresh id.
    #[must_use]
    pub fn new(user_id: UserId, number: OrderNumber, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            number,
            uploaded_at,
        }
    }

    /// Materialises the order exactly as it is first stored.
    #[must_use]
    pub fn into_order(self) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            number: self.number,
            status: OrderStatus::New,
            accrual: None,
            uploaded_at: self.uploaded_at,
        }
    }
}
