//! Application error types

use thiserror::Error;

use brawl_domain::DomainError;

use crate::auth::AuthError;
use crate::bootstrap::BootstrapError;
use crate::ports::{DocumentError, IdentityError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An auth use case failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// The identity provider failed outside an auth use case.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// The document store failed outside an auth use case.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// The service context could not be created.
    #[error("bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// The services are not available in this runtime.
    #[error("services unavailable in a non-interactive runtime")]
    ServicesUnavailable,

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
