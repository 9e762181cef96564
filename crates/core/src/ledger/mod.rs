//! Points ledger.
//!
//! This module implements:
//! - Per-user balances (`current` spendable, `withdrawn` cumulative)
//! - The append-only withdrawal log
//! - Deposit and withdraw operations that never overdraw

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::LedgerError;
pub use service::LedgerService;
pub use store::{DebitOutcome, LedgerStore};
pub use types::{Balance, NewWithdrawal, POINTS_SCALE, Withdrawal};
