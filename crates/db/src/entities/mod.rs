//! `SeaORM` entities for the loyalty schema.

pub mod balances;
pub mod orders;
pub mod users;
pub mod withdrawals;
