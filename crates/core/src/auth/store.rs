use async_trait::async_trait;
use loyalty_shared::types::UserId;

use crate::store::StoreError;

/// A registered user as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Unique login.
    pub login: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user and its zero balance atomically.
    ///
    /// Returns `None` if the login is already taken.
    async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Looks up a user by login.
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError>;
}
