//! Authentication use cases.
//!
//! Thin wrappers over the identity and document ports. Failures are
//! logged and then handed back to the caller unchanged, except for
//! [`AuthService::can_start_new_debate`], which fails closed.

use std::sync::Arc;

use thiserror::Error;

use brawl_domain::{
    DEFAULT_FREE_DEBATES, DomainError, SessionHandle, Timestamp, USERS_COLLECTION, UserDocument,
    has_remaining_free_debates, validate_uid,
};

use crate::bootstrap::ServiceContext;
use crate::ports::{Clock, DocumentError, DocumentStore, IdentityError, IdentityService};

/// Errors returned by the auth use cases.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the request.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The document store rejected the request.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The account was created but its profile document was not written.
    ///
    /// The account is not rolled back; the caller decides whether to retry
    /// the write or delete the account.
    #[error("account {uid} created but profile was not written: {source}")]
    ProfileNotWritten {
        /// Uid of the account that now exists without a profile.
        uid: String,
        /// Why the write failed.
        #[source]
        source: DocumentError,
    },

    /// Input could not be turned into a valid document.
    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),
}

/// Register, login, logout and quota checks.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityService>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    starting_free_debates: i64,
}

impl AuthService {
    /// Creates the service over explicit ports.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityService>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            documents,
            clock,
            starting_free_debates: DEFAULT_FREE_DEBATES,
        }
    }

    /// Creates the service over a bootstrapped context.
    #[must_use]
    pub fn from_context(context: &ServiceContext, clock: Arc<dyn Clock>) -> Self {
        Self::new(context.identity(), context.documents(), clock)
    }

    /// Sets the free-debate quota written for new users.
    #[must_use]
    pub const fn with_starting_free_debates(mut self, quota: i64) -> Self {
        self.starting_free_debates = quota;
        self
    }

    /// Creates an account and its user document.
    ///
    /// # Errors
    ///
    /// - `Identity` if the account cannot be created (email in use, weak
    ///   password, network).
    /// - `ProfileNotWritten` if the account exists but the document write
    ///   failed.
    /// - `Domain` if the clock reads outside the storable range; no account
    ///   is created in that case.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        username: &str,
    ) -> Result<SessionHandle, AuthError> {
        let created_at = Timestamp::from_date_time(self.clock.now())
            .inspect_err(|e| tracing::error!(error = %e, "error registering user"))?;

        let session = self
            .identity
            .create_account(email, password)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error registering user"))?;

        let document = UserDocument::new(&session.uid, email, name, username, created_at)
            .with_free_debates(self.starting_free_debates);

        if let Err(source) = self
            .documents
            .write_document(USERS_COLLECTION, &session.uid, &document.to_fields())
            .await
        {
            tracing::error!(uid = %session.uid, error = %source, "error registering user");
            return Err(AuthError::ProfileNotWritten {
                uid: session.uid,
                source,
            });
        }

        tracing::info!(uid = %session.uid, "registered user");
        Ok(session)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Identity` for bad credentials or transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionHandle, AuthError> {
        let session = self
            .identity
            .authenticate(email, password)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error logging in"))?;
        tracing::info!(uid = %session.uid, "logged in");
        Ok(session)
    }

    /// Signs the current user out.
    ///
    /// # Errors
    ///
    /// Returns `Identity` if the provider fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.identity
            .end_session()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error logging out"))?;
        Ok(())
    }

    /// The locally cached session, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<SessionHandle> {
        self.identity.current_session()
    }

    /// Returns true if the user's document grants another free debate.
    ///
    /// Any failure (invalid uid, unreadable or missing document, missing or
    /// non-numeric quota) answers `false`.
    pub async fn can_start_new_debate(&self, uid: &str) -> bool {
        if let Err(e) = validate_uid(uid) {
            tracing::error!(error = %e, "error checking debate eligibility");
            return false;
        }

        match self.documents.read_document(USERS_COLLECTION, uid).await {
            Ok(Some(fields)) => has_remaining_free_debates(&fields),
            Ok(None) => false,
            Err(e) => {
                tracing::error!(uid, error = %e, "error checking debate eligibility");
                false
            }
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("starting_free_debates", &self.starting_free_debates)
            .finish_non_exhaustive()
    }
}
