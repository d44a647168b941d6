//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A timestamp falls outside the range the backend can represent.
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(String),

    /// A toast kind other than `status` or `error` was requested.
    #[error("unknown toast kind: {0}")]
    UnknownToastKind(String),

    /// A debate outcome string did not match a known result.
    #[error("unknown debate result: {0}")]
    UnknownDebateResult(String),

    /// A document field is missing or has the wrong type.
    #[error("invalid document field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
