//! Contract with the external accrual authority.
//!
//! The authority is eventually consistent: an order may be unknown for a while,
//! then `REGISTERED`/`PROCESSING`, and finally `INVALID` or `PROCESSED` with an
//! accrual. The gateway classifies every response into [`AccrualOutcome`] and
//! never retries on its own.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::order::{OrderNumber, OrderStatus};

/// Status reported by the accrual authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    /// Known but not yet scored.
    Registered,
    /// Being scored.
    Processing,
    /// Rejected.
    Invalid,
    /// Scored.
    Processed,
}

impl UpstreamStatus {
    /// Maps the upstream status onto the local order lifecycle.
    #[must_use]
    pub const fn order_status(self) -> OrderStatus {
        match self {
            Self::Registered | Self::Processing => OrderStatus::Processing,
            Self::Invalid => OrderStatus::Invalid,
            Self::Processed => OrderStatus::Processed,
        }
    }

    /// Parses the upstream wire value.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "REGISTERED" => Some(Self::Registered),
            "PROCESSING" => Some(Self::Processing),
            "INVALID" => Some(Self::Invalid),
            "PROCESSED" => Some(Self::Processed),
            _ => None,
        }
    }
}

/// A decoded `200` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualReport {
    /// Upstream status.
    pub status: UpstreamStatus,
    /// Points granted; only meaningful for `Processed`.
    pub accrual: Option<Decimal>,
}

/// Classified result of one upstream lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// The authority knows the order.
    Found(AccrualReport),
    /// Not registered upstream yet; try again next cycle.
    NotFound,
    /// Throttled; no upstream calls before `retry_after` has elapsed.
    RateLimited {
        /// Backoff requested by the authority.
        retry_after: Duration,
    },
    /// Network error, 5xx, unexpected status or undecodable body.
    TransientFailure {
        /// Human-readable cause for logs.
        reason: String,
    },
}

/// Client for the accrual authority.
#[async_trait]
pub trait AccrualGateway: Send + Sync {
    /// Looks up one order.
    async fn fetch(&self, number: &OrderNumber) -> AccrualOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("REGISTERED", OrderStatus::Processing)]
    #[case("PROCESSING", OrderStatus::Processing)]
    #[case("INVALID", OrderStatus::Invalid)]
    #[case("PROCESSED", OrderStatus::Processed)]
    fn test_status_mapping(#[case] wire: &str, #[case] expected: OrderStatus) {
        let status = UpstreamStatus::from_wire(wire).unwrap();
        assert_eq!(status.order_status(), expected);
    }

    #[test]
    fn test_unknown_wire_status() {
        assert_eq!(UpstreamStatus::from_wire("NEW"), None);
        assert_eq!(UpstreamStatus::from_wire("processed"), None);
    }
}
