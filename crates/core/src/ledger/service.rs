//! Ledger service: deposit, withdraw and queries.

use std::sync::Arc;

use loyalty_shared::types::{UserId, WithdrawalId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::LedgerError;
use super::store::{DebitOutcome, LedgerStore};
use super::types::{Balance, NewWithdrawal, POINTS_SCALE, Withdrawal};
use crate::clock::Clock;
use crate::order::OrderNumber;

/// Balance operations for the outward API.
///
/// The service validates input; the store performs each mutation atomically so
/// `current` can never go negative, whatever the interleaving of callers.
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    /// Creates a new service.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Adds `amount` to the user's spendable balance.
    pub async fn deposit(&self, user_id: UserId, amount: Decimal) -> Result<Balance, LedgerError> {
        ensure_storable(amount)?;

        let balance = self
            .store
            .credit(user_id, amount, self.clock.now())
            .await?
            .ok_or(LedgerError::BalanceNotFound(user_id))?;

        info!(user_id = %user_id, amount = %amount, current = %balance.current, "Deposit applied");
        Ok(balance)
    }

    /// Spends `amount` points on `raw_order`.
    ///
    /// Validation order: order number format, then amount, then funds.
    pub async fn withdraw(
        &self,
        user_id: UserId,
        raw_order: &str,
        amount: Decimal,
    ) -> Result<Withdrawal, LedgerError> {
        let order_number =
            OrderNumber::parse(raw_order).map_err(|e| LedgerError::InvalidOrderFormat(e.0))?;
        ensure_storable(amount)?;

        let request = NewWithdrawal {
            id: WithdrawalId::new(),
            user_id,
            order_number,
            sum: amount,
            processed_at: self.clock.now(),
        };

        match self.store.debit(request).await? {
            DebitOutcome::Applied { balance, withdrawal } => {
                info!(
                    user_id = %user_id,
                    order = %withdrawal.order_number,
                    sum = %withdrawal.sum,
                    current = %balance.current,
                    "Withdrawal applied"
                );
                Ok(withdrawal)
            }
            DebitOutcome::InsufficientFunds { available } => {
                warn!(user_id = %user_id, requested = %amount, available = %available, "Insufficient funds");
                Err(LedgerError::InsufficientFunds {
                    requested: amount,
                    available,
                })
            }
            DebitOutcome::BalanceNotFound => Err(LedgerError::BalanceNotFound(user_id)),
        }
    }

    /// Returns the user's balance.
    pub async fn balance(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        self.store
            .balance(user_id)
            .await?
            .ok_or(LedgerError::BalanceNotFound(user_id))
    }

    /// Returns the user's withdrawals, newest first.
    pub async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, LedgerError> {
        Ok(self.store.withdrawals(user_id).await?)
    }
}

/// Amounts must be positive and fit the ledger's fixed scale.
fn ensure_storable(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if amount.normalize().scale() > POINTS_SCALE {
        return Err(LedgerError::TooPrecise(amount));
    }
    Ok(())
}
