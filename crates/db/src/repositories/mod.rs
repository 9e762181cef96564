//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! The order and ledger stores implement the `loyalty-core` store traits.

mod convert;
pub mod ledger;
pub mod order;
pub mod user;

pub use ledger::PgLedgerStore;
pub use order::PgOrderStore;
pub use user::{CreateUser, UserRepository};
