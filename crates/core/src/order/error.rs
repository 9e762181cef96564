//! Order admission errors.

use loyalty_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`OrderService`](super::OrderService).
#[derive(Debug, Error)]
pub enum OrderError {
    /// The number failed the Luhn check.
    #[error("invalid order number format: {0:?}")]
    InvalidOrderFormat(String),

    /// The number is already claimed by a different user.
    #[error("order {0} was uploaded by another user")]
    AlreadyUploadedByOther(String),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidOrderFormat(_) => Self::InvalidOrderNumber(err.to_string()),
            OrderError::AlreadyUploadedByOther(_) => Self::Conflict(err.to_string()),
            OrderError::Store(e) => e.into(),
        }
    }
}
