//! Ledger error types.

use loyalty_shared::AppError;
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`LedgerService`](super::LedgerService).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The order number failed the Luhn check.
    #[error("invalid order number format: {0:?}")]
    InvalidOrderFormat(String),

    /// Amounts must be strictly positive.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// More decimal places than balances store.
    #[error("amount {0} has more than 4 decimal places")]
    TooPrecise(Decimal),

    /// The balance cannot cover the withdrawal.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount asked for.
        requested: Decimal,
        /// Spendable points.
        available: Decimal,
    },

    /// The user has no balance row.
    #[error("balance not found for user {0}")]
    BalanceNotFound(UserId),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidOrderFormat(_) => Self::InvalidOrderNumber(err.to_string()),
            LedgerError::NonPositiveAmount(_) | LedgerError::TooPrecise(_) => {
                Self::BusinessRule(err.to_string())
            }
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(err.to_string()),
            LedgerError::BalanceNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(LedgerError, u16)> = vec![
            (LedgerError::InvalidOrderFormat("x".into()), 422),
            (LedgerError::NonPositiveAmount(dec!(0)), 422),
            (LedgerError::TooPrecise(dec!(0.00001)), 422),
            (
                LedgerError::InsufficientFunds {
                    requested: dec!(200),
                    available: dec!(100),
                },
                402,
            ),
            (LedgerError::BalanceNotFound(UserId::new()), 404),
            (LedgerError::Store(StoreError::Database("down".into())), 500),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = LedgerError::InsufficientFunds {
            requested: dec!(200),
            available: dec!(100),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: requested 200, available 100"
        );
    }
}
