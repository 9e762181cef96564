//! Authentication types for JWT bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// JWT claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User login, for logging only.
    pub login: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, login: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.into_inner(),
            login: login.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// Register and login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    /// Unique login.
    #[serde(default)]
    pub login: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    /// Both fields are required and must be non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.login.trim().is_empty() && !self.password.is_empty()
    }
}

/// Body returned after a successful register or login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// User ID.
    pub id: Uuid,
    /// User login.
    pub login: String,
    /// Bearer token (also sent in the `Authorization` header).
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}
