//! Test doubles for the loyalty ledger.
//!
//! - [`MemoryStore`] implements `UserStore`, `OrderStore` and `LedgerStore` over one
//!   mutex, so a settlement and its credit are atomic like the Postgres store.
//! - [`ScriptedGateway`] answers accrual lookups from a script and records calls.
//! - [`ManualClock`] and [`TokioClock`] give tests control over time.

mod clock;
mod gateway;
mod store;

pub use clock::{ManualClock, TokioClock};
pub use gateway::ScriptedGateway;
pub use store::MemoryStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
