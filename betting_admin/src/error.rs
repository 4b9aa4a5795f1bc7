//! Error type shared by every module of the crate.

use thiserror::Error;

/// Coarse classification of an [`AdminError`], used by the HTTP layer to
/// pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or a business-rule violation (400)
    Validation,
    /// Referenced entity is absent (404)
    NotFound,
    /// Missing or invalid credentials (401)
    Unauthorized,
    /// Authenticated but not allowed (403)
    Forbidden,
    /// Anything unexpected (500)
    Internal,
}

/// Administration errors
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Entity not found
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique field already taken
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    /// Debit larger than the balance field holds
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// Status change not allowed from the current state
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Missing or invalid credentials
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Caller lacks the required role or account state
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// JWT token error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// A balance field or the wallet total would exceed `i64::MAX`
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Random public id kept colliding
    #[error("Could not allocate a unique {field} after {attempts} attempts")]
    IdExhausted { field: &'static str, attempts: u32 },

    /// Stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    /// Shorthand for [`AdminError::NotFound`]
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        AdminError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for [`AdminError::Validation`]
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(message.into())
    }

    /// Classify the error for status-code mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::Validation(_)
            | AdminError::Duplicate(_)
            | AdminError::InsufficientBalance { .. }
            | AdminError::InvalidTransition { .. }
            | AdminError::BalanceOverflow => ErrorKind::Validation,
            AdminError::NotFound { .. } => ErrorKind::NotFound,
            AdminError::Unauthorized(_) | AdminError::Jwt(_) => ErrorKind::Unauthorized,
            AdminError::Forbidden(_) => ErrorKind::Forbidden,
            AdminError::Database(_)
            | AdminError::HashingFailed
            | AdminError::IdExhausted { .. }
            | AdminError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak internal details
    pub fn client_message(&self) -> String {
        match self {
            AdminError::Jwt(_) => "Authentication failed".to_string(),
            _ if self.kind() == ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for administration operations
pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AdminError::validation("bad").kind(), ErrorKind::Validation);
        assert_eq!(
            AdminError::Duplicate("email".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(AdminError::not_found("User", 123456).kind(), ErrorKind::NotFound);
        assert_eq!(
            AdminError::Forbidden("admin only".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(AdminError::BalanceOverflow.kind(), ErrorKind::Validation);
        assert_eq!(AdminError::HashingFailed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_client_message_sanitizes_internal_errors() {
        let err = AdminError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Internal server error");

        let err = AdminError::IdExhausted {
            field: "user_id",
            attempts: 5,
        };
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_message_keeps_business_errors() {
        let err = AdminError::InsufficientBalance {
            available: 10,
            required: 50,
        };
        assert_eq!(
            err.client_message(),
            "Insufficient balance: available 10, required 50"
        );
        assert_eq!(
            AdminError::not_found("Betting", 654321).client_message(),
            "Betting not found: 654321"
        );
    }
}
