//! Common error types

use thiserror::Error;

/// Errors raised when parsing domain values from strings or numbers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown service type tag
    #[error("unknown service type: {0}")]
    ServiceType(String),

    /// Duration is not one of the offered subscription terms
    #[error("unsupported subscription duration: {0} days")]
    Term(i64),

    /// Unknown payment method tag
    #[error("unknown payment method: {0}")]
    PaymentMethod(String),
}
