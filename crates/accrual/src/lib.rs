//! HTTP client for the accrual authority.
//!
//! Implements [`loyalty_core::accrual::AccrualGateway`] over
//! `GET {base_url}/api/orders/{number}`.

mod gateway;
mod wire;

pub use gateway::{GatewayError, HttpAccrualGateway, HttpAccrualGatewayConfig};
