//! Order admission.
//!
//! This module implements:
//! - Luhn validation of order numbers
//! - The order lifecycle (`NEW → PROCESSING → PROCESSED | INVALID`)
//! - Idempotent order submission with fixed ownership

pub mod error;
pub mod number;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod number_props;

pub use error::OrderError;
pub use number::{InvalidOrderNumber, OrderNumber, is_valid_order_number};
pub use service::{OrderService, Submission};
pub use store::{InsertOrder, OrderStore, SettleOutcome, Settlement};
pub use types::{NewOrder, Order, OrderStatus, ParseOrderStatusError};
