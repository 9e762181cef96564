//! Core business logic for the loyalty ledger.
//!
//! This crate has ZERO web or database dependencies. Persistence and the
//! accrual authority are reached through the traits defined here and
//! implemented in `loyalty-db` and `loyalty-accrual`.
//!
//! # Modules
//!
//! - `order` - Order number validation, lifecycle and admission
//! - `ledger` - Balances, withdrawals and the no-overdraft rule
//! - `accrual` - Contract with the external accrual authority
//! - `reconcile` - Periodic reconciliation of open orders
//! - `auth` - Registration, login and password hashing
//! - `clock` - Injectable time source

pub mod accrual;
pub mod auth;
pub mod clock;
pub mod ledger;
pub mod order;
pub mod reconcile;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use store::StoreError;
