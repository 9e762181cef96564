//! Application-wide error types.
//!
//! Every failure that reaches the outward API is one of these variants; the
//! HTTP layer picks the response status from [`AppError::status_code`] and never
//! inspects message text.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or credentials are missing.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request (bad JSON, empty required field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order number failed the Luhn check.
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    /// Business rule violation (e.g. non-positive amount).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (login taken, order owned by another user).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Balance too low for the requested withdrawal.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::InvalidOrderNumber(_) | Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::InsufficientFunds(_) => 402,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidOrderNumber(_) => "INVALID_ORDER_NUMBER",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the message is safe to show to the caller.
    ///
    /// Server-side failures are reported with a generic message instead.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::InvalidOrderNumber(String::new()), 422, "INVALID_ORDER_NUMBER")]
    #[case(AppError::BusinessRule(String::new()), 422, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::InsufficientFunds(String::new()), 402, "INSUFFICIENT_FUNDS")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::ExternalService(String::new()), 500, "EXTERNAL_SERVICE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_error_mapping(#[case] error: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::InvalidOrderNumber("123".into()).to_string(),
            "Invalid order number: 123"
        );
        assert_eq!(
            AppError::InsufficientFunds("msg".into()).to_string(),
            "Insufficient funds: msg"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
    }

    #[test]
    fn test_client_errors_exclude_server_failures() {
        assert!(AppError::Conflict(String::new()).is_client_error());
        assert!(AppError::InsufficientFunds(String::new()).is_client_error());
        assert!(!AppError::Database(String::new()).is_client_error());
        assert!(!AppError::Internal(String::new()).is_client_error());
    }
}
