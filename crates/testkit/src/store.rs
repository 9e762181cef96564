use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loyalty_core::StoreError;
use loyalty_core::auth::{UserRecord, UserStore};
use loyalty_core::ledger::{Balance, DebitOutcome, LedgerStore, NewWithdrawal, Withdrawal};
use loyalty_core::order::{
    InsertOrder, NewOrder, Order, OrderNumber, OrderStatus, OrderStore, SettleOutcome, Settlement,
};
use loyalty_shared::types::UserId;
use rust_decimal::Decimal;

use crate::lock;

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserRecord>,
    orders: Vec<Order>,
    balances: HashMap<UserId, Balance>,
    withdrawals: Vec<Withdrawal>,
}

/// In-memory user, order and ledger store.
///
/// Every operation holds one mutex for its whole duration, which gives the
/// same per-call atomicity the Postgres transactions provide.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_settle: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the zero balance row that registration would create.
    pub fn open_account(&self, user_id: UserId) {
        lock(&self.state)
            .balances
            .entry(user_id)
            .or_insert_with(|| Balance::empty(user_id, Utc::now()));
    }

    /// Registers a fresh user with an empty balance.
    #[must_use]
    pub fn new_user(&self) -> UserId {
        let user_id = UserId::new();
        self.open_account(user_id);
        user_id
    }

    /// Returns the stored row for `number`.
    #[must_use]
    pub fn order(&self, number: &str) -> Option<Order> {
        lock(&self.state)
            .orders
            .iter()
            .find(|o| o.number.as_str() == number)
            .cloned()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }

    /// Makes every subsequent `settle` fail with a database error.
    pub fn fail_settlements(&self, fail: bool) {
        self.fail_settle.store(fail, Ordering::SeqCst);
    }
}

fn credit_locked(state: &mut State, user_id: UserId, amount: Decimal, at: DateTime<Utc>) -> Option<Balance> {
    let balance = state.balances.get_mut(&user_id)?;
    balance.current += amount;
    balance.updated_at = at;
    Some(balance.clone())
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        Ok(lock(&self.state)
            .orders
            .iter()
            .find(|o| &o.number == number)
            .cloned())
    }

    async fn insert(&self, order: NewOrder) -> Result<InsertOrder, StoreError> {
        let mut state = lock(&self.state);
        if let Some(existing) = state.orders.iter().find(|o| o.number == order.number) {
            return Ok(InsertOrder::Existing(existing.clone()));
        }
        let order = order.into_order();
        state.orders.push(order.clone());
        Ok(InsertOrder::Created(order))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = lock(&self.state)
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |o| o.uploaded_at);
        Ok(orders)
    }

    async fn list_open(&self) -> Result<Vec<Order>, StoreError> {
        let mut open: Vec<Order> = lock(&self.state)
            .orders
            .iter()
            .filter(|o| o.status.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|o| o.uploaded_at);
        Ok(open)
    }

    async fn mark_processing(
        &self,
        number: &OrderNumber,
        _at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = lock(&self.state);
        match state
            .orders
            .iter_mut()
            .find(|o| &o.number == number && o.status == OrderStatus::New)
        {
            Some(order) => {
                order.status = OrderStatus::Processing;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn settle(
        &self,
        number: &OrderNumber,
        settlement: Settlement,
        at: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError> {
        let mut state = lock(&self.state);
        if self.fail_settle.load(Ordering::SeqCst) {
            return Err(StoreError::Database("injected settle failure".to_string()));
        }

        let Some(index) = state
            .orders
            .iter()
            .position(|o| &o.number == number && o.status.is_open())
        else {
            return Ok(SettleOutcome::AlreadyTerminal);
        };

        let (status, accrual, credit) = match settlement {
            Settlement::Processed { accrual } => (OrderStatus::Processed, Some(accrual), accrual),
            Settlement::Invalid => (OrderStatus::Invalid, None, Decimal::ZERO),
        };
        let owner = state.orders[index].user_id;
        if credit > Decimal::ZERO && !state.balances.contains_key(&owner) {
            return Err(StoreError::Corrupt(format!("no balance row for user {owner}")));
        }

        let order = &mut state.orders[index];
        order.status = status;
        order.accrual = accrual;
        if credit > Decimal::ZERO {
            credit_locked(&mut state, owner, credit, at);
        }

        Ok(SettleOutcome::Applied { credited: credit })
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn balance(&self, user_id: UserId) -> Result<Option<Balance>, StoreError> {
        Ok(lock(&self.state).balances.get(&user_id).cloned())
    }

    async fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Option<Balance>, StoreError> {
        Ok(credit_locked(&mut lock(&self.state), user_id, amount, at))
    }

    async fn debit(&self, request: NewWithdrawal) -> Result<DebitOutcome, StoreError> {
        let mut state = lock(&self.state);
        let Some(balance) = state.balances.get_mut(&request.user_id) else {
            return Ok(DebitOutcome::BalanceNotFound);
        };

        if balance.current < request.sum {
            return Ok(DebitOutcome::InsufficientFunds {
                available: balance.current,
            });
        }

        balance.current -= request.sum;
        balance.withdrawn += request.sum;
        balance.updated_at = request.processed_at;
        let balance = balance.clone();

        let withdrawal = request.into_withdrawal();
        state.withdrawals.push(withdrawal.clone());
        Ok(DebitOutcome::Applied { balance, withdrawal })
    }

    async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError> {
        let mut withdrawals: Vec<Withdrawal> = lock(&self.state)
            .withdrawals
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut withdrawals, |w| w.processed_at);
        Ok(withdrawals)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut state = lock(&self.state);
        if state.users.contains_key(login) {
            return Ok(None);
        }

        let user = UserRecord {
            id: UserId::new(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
        };
        state.users.insert(user.login.clone(), user.clone());
        state
            .balances
            .insert(user.id, Balance::empty(user.id, Utc::now()));
        Ok(Some(user))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(lock(&self.state).users.get(login).cloned())
    }
}
