//! Identity service port
//!
//! Defines the interface to the hosted identity provider.

use async_trait::async_trait;
use thiserror::Error;

use brawl_domain::{SessionHandle, SignInProvider};

use crate::session::SessionWatch;

/// Errors raised by the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// An account already exists for the email address.
    #[error("email address already in use")]
    EmailInUse,

    /// The password does not meet the provider's strength rules.
    #[error("password is too weak: {0}")]
    WeakPassword(String),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but has been disabled.
    #[error("account disabled")]
    AccountDisabled,

    /// The user abandoned an interactive sign-in.
    #[error("sign-in cancelled by user")]
    Cancelled,

    /// No interactive flow is available for the provider.
    #[error("sign-in provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The session can no longer be renewed; the user must sign in again.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Any other provider-side failure.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// The persisted session could not be read or written.
    #[error("session persistence error: {0}")]
    Persistence(String),
}

/// Where the signed-in session survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    /// Kept only for the life of the process.
    #[default]
    InMemory,
    /// Written to durable local storage and restored on start.
    Local,
}

/// Port to the hosted identity service.
///
/// Failures are reported as-is; this layer never retries.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates an email/password account and signs it in.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionHandle, IdentityError>;

    /// Signs in with email and password.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<SessionHandle, IdentityError>;

    /// Signs the current user out.
    async fn end_session(&self) -> Result<(), IdentityError>;

    /// The locally cached session, if any.
    fn current_session(&self) -> Option<SessionHandle>;

    /// Bearer token of the current session for backend calls.
    ///
    /// Services that can renew tokens do so here when the token has
    /// expired or is about to. The default returns the cached token as is.
    async fn id_token(&self) -> Result<Option<String>, IdentityError> {
        Ok(self
            .current_session()
            .and_then(|s| s.id_token().map(str::to_string)))
    }

    /// Subscribes to session changes.
    ///
    /// The first event reflects the session at subscription time.
    fn watch_session(&self) -> SessionWatch;

    /// Runs the provider's interactive sign-in flow.
    async fn interactive_sign_in(
        &self,
        provider: &SignInProvider,
    ) -> Result<SessionHandle, IdentityError>;

    /// Chooses where the session is kept.
    ///
    /// Switching to [`Persistence::Local`] restores a previously saved
    /// session if none is active.
    async fn set_persistence(&self, persistence: Persistence) -> Result<(), IdentityError>;
}
