use std::sync::Arc;

use tracing::info;

use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::store::{UserRecord, UserStore};

/// Register and login checks. Token issuance is left to the caller.
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Creates a new service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Registers a new user with an empty balance.
    pub async fn register(&self, login: &str, password: &str) -> Result<UserRecord, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create_user(login, &password_hash)
            .await?
            .ok_or_else(|| AuthError::LoginTaken(login.to_string()))?;

        info!(user_id = %user.id, login = %user.login, "User registered");
        Ok(user)
    }

    /// Checks a login/password pair.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<UserRecord, AuthError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(user) = self.users.find_by_login(login).await? else {
            info!(login = %login, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            Err(AuthError::InvalidCredentials)
        }
    }
}
