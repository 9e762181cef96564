//! Registration and login.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The user persistence contract
//! - Credential checks for register and login

mod error;
mod password;
mod service;
mod store;

pub use error::AuthError;
pub use password::{PasswordError, hash_password, verify_password};
pub use service::AuthService;
pub use store::{UserRecord, UserStore};
