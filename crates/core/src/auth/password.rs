//! Argon2id password hashing.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use loyalty_shared::AppError;
use thiserror::Error;

/// Errors that can occur while hashing or checking a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Verification failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    Verify(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Hashes a password into a PHC string with a random salt.
///
/// ```
/// use loyalty_core::auth::hash_password;
///
/// let hash = hash_password("hunter2").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`, not an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("pw", "plaintext"),
            Err(PasswordError::MalformedHash)
        ));
    }

    #[test]
    fn test_maps_to_internal_error() {
        let err: AppError = PasswordError::MalformedHash.into();
        assert_eq!(err.status_code(), 500);
    }
}
