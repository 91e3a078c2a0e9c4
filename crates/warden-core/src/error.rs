//! Core errors

use thiserror::Error;
use warden_types::{ParseError, ServiceType};

/// Errors surfaced by entitlement, lifecycle and account operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller-supplied value is out of range or malformed
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Referenced record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Wrong username or password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account has been disabled
    #[error("account disabled")]
    AccountDisabled,

    /// Session token is malformed or its signature does not match
    #[error("invalid session token")]
    InvalidToken,

    /// Session token has expired
    #[error("session expired")]
    TokenExpired,

    /// Gated service with no subscription and no trial left
    #[error("a subscription is required to use {0}")]
    AccessDenied(ServiceType),

    /// Payment verifier refused the claim
    #[error("payment rejected: {0}")]
    PaymentRejected(String),

    /// Store rejected a write on a constraint
    #[error("constraint violated: {0}")]
    ConstraintViolated(String),

    /// Store could not be reached or failed mid-operation
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed(_) => 400,
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => 401,
            Self::AccessDenied(_) | Self::PaymentRejected(_) => 402,
            Self::AccountDisabled => 403,
            Self::NotFound(_) => 404,
            Self::ConstraintViolated(_) => 409,
            Self::StoreUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AccessDenied(_) => "SUBSCRIPTION_REQUIRED",
            Self::PaymentRejected(_) => "PAYMENT_REJECTED",
            Self::ConstraintViolated(_) => "CONSTRAINT_VIOLATED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<warden_db::DbError> for CoreError {
    fn from(err: warden_db::DbError) -> Self {
        use warden_db::DbError;

        match err {
            DbError::NotFound => Self::NotFound("record"),
            DbError::ConstraintViolated(msg) => Self::ConstraintViolated(msg),
            DbError::Decode(msg) => {
                tracing::error!(error = %msg, "Corrupt row in store");
                Self::Internal(msg)
            }
            other @ (DbError::Sqlx(_) | DbError::Migrate(_)) => {
                tracing::error!(error = %other, "Store error");
                Self::StoreUnavailable(other.to_string())
            }
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
