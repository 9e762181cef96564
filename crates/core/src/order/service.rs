//! Order admission service.

use std::sync::Arc;

use loyalty_shared::types::UserId;
use tracing::{debug, info};

use super::error::OrderError;
use super::number::OrderNumber;
use super::store::{InsertOrder, OrderStore};
use super::types::{NewOrder, Order};
use crate::clock::Clock;

/// Successful result of [`OrderService::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A new `NEW` order was created.
    Accepted(Order),
    /// The caller already owns this number; nothing changed.
    AlreadyUploadedBySelf(Order),
}

impl Submission {
    /// Returns the order in either case.
    #[must_use]
    pub const fn order(&self) -> &Order {
        match self {
            Self::Accepted(order) | Self::AlreadyUploadedBySelf(order) => order,
        }
    }
}

/// Submit and list operations for the outward API.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    /// Creates a new service.
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Claims `raw_number` for `user_id`.
    ///
    /// Resubmitting an owned number is a no-op; a number owned by someone else
    /// is a conflict and its owner never changes.
    pub async fn submit(&self, user_id: UserId, raw_number: &str) -> Result<Submission, OrderError> {
        let number = OrderNumber::parse(raw_number)
            .map_err(|e| OrderError::InvalidOrderFormat(e.0))?;

        if let Some(existing) = self.store.find_by_number(&number).await? {
            return Self::verdict(user_id, existing);
        }

        let new_order = NewOrder::new(user_id, number, self.clock.now());
        match self.store.insert(new_order).await? {
            InsertOrder::Created(order) => {
                info!(user_id = %user_id, order = %order.number, "Order accepted");
                Ok(Submission::Accepted(order))
            }
            InsertOrder::Existing(existing) => {
                debug!(order = %existing.number, "Lost insert race, using existing row");
                Self::verdict(user_id, existing)
            }
        }
    }

    /// Returns the user's orders, newest first.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_by_user(user_id).await?)
    }

    fn verdict(user_id: UserId, existing: Order) -> Result<Submission, OrderError> {
        if existing.user_id == user_id {
            Ok(Submission::AlreadyUploadedBySelf(existing))
        } else {
            Err(OrderError::AlreadyUploadedByOther(existing.number.into_inner()))
        }
    }
}
