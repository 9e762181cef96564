//! Errors shared by the storage traits.

use loyalty_shared::AppError;
use thiserror::Error;

/// Failure reported by an [`OrderStore`](crate::order::store::OrderStore) or
/// [`LedgerStore`](crate::ledger::store::LedgerStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing database rejected or failed the operation.
    #[error("database error: {0}")]
    Database(String),

    /// A persisted row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Database(err.to_string())
    }
}
