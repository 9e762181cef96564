use loyalty_shared::AppError;
use thiserror::Error;

use super::password::PasswordError;
use crate::store::StoreError;

/// Errors returned by [`AuthService`](super::AuthService).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login or password is blank.
    #[error("login and password are required")]
    MissingCredentials,

    /// Another user holds the login.
    #[error("login {0:?} is already taken")]
    LoginTaken(String),

    /// Unknown login or wrong password.
    #[error("invalid login or password")]
    InvalidCredentials,

    /// Hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::Validation(err.to_string()),
            AuthError::LoginTaken(_) => Self::Conflict(err.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Password(e) => e.into(),
            AuthError::Store(e) => e.into(),
        }
    }
}
