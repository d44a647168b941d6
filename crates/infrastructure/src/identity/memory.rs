//! Process-local identity service for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use brawl_application::{
    IdentityError, IdentityService, Persistence, SessionCache, SessionPersistence, SessionWatch,
};
use brawl_domain::{PASSWORD_PROVIDER_ID, SessionHandle, SignInProvider, generate_uid};

/// Minimum password length, matching the hosted service.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    disabled: bool,
}

/// Identity service that keeps accounts in memory.
///
/// Passwords are held in plain text; this backend never leaves the
/// process. Federated accounts are registered up front with
/// [`Self::add_federated_account`].
#[derive(Default)]
pub struct InMemoryIdentityService {
    accounts: Mutex<HashMap<String, Account>>,
    federated: Mutex<HashMap<String, SessionHandle>>,
    cache: SessionCache,
}

impl InMemoryIdentityService {
    /// Creates a service with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists sessions through `store` once local persistence is enabled.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionPersistence>) -> Self {
        self.cache = SessionCache::with_store(store);
        self
    }

    /// Makes `session` the result of interactive sign-in with `provider`.
    pub fn add_federated_account(&self, provider: &SignInProvider, session: SessionHandle) {
        self.federated
            .lock()
            .insert(provider.id().to_string(), session);
    }

    /// Marks the account for `email` as disabled. Returns false if unknown.
    pub fn disable_account(&self, email: &str) -> bool {
        let mut accounts = self.accounts.lock();
        let Some(account) = accounts.get_mut(&normalize(email)) else {
            return false;
        };
        account.disabled = true;
        true
    }

    /// Installs `session` as the current session without authenticating.
    pub async fn restore_session(&self, session: SessionHandle) {
        self.cache.sign_in(session).await;
    }

    /// Number of registered email/password accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_session(uid: &str, email: &str) -> SessionHandle {
    SessionHandle::new(uid, PASSWORD_PROVIDER_ID).with_email(email.trim())
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionHandle, IdentityError> {
        let key = normalize(email);
        if key.is_empty() || !key.contains('@') {
            return Err(IdentityError::Provider("INVALID_EMAIL".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let session = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(&key) {
                return Err(IdentityError::EmailInUse);
            }
            let uid = generate_uid();
            accounts.insert(
                key,
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                    disabled: false,
                },
            );
            password_session(&uid, email)
        };

        self.cache.sign_in(session.clone()).await;
        Ok(session)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionHandle, IdentityError> {
        let account = self
            .accounts
            .lock()
            .get(&normalize(email))
            .cloned()
            .ok_or(IdentityError::InvalidCredentials)?;
        if account.password != password {
            return Err(IdentityError::InvalidCredentials);
        }
        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }

        let session = password_session(&account.uid, email);
        self.cache.sign_in(session.clone()).await;
        Ok(session)
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        self.cache.sign_out().await;
        Ok(())
    }

    fn current_session(&self) -> Option<SessionHandle> {
        self.cache.current()
    }

    fn watch_session(&self) -> SessionWatch {
        self.cache.watch()
    }

    async fn interactive_sign_in(
        &self,
        provider: &SignInProvider,
    ) -> Result<SessionHandle, IdentityError> {
        let session = self
            .federated
            .lock()
            .get(provider.id())
            .cloned()
            .ok_or_else(|| IdentityError::ProviderUnavailable(provider.to_string()))?;

        self.cache.sign_in(session.clone()).await;
        Ok(session)
    }

    async fn set_persistence(&self, persistence: Persistence) -> Result<(), IdentityError> {
        self.cache
            .set_persistence(persistence)
            .await
            .map_err(|e| IdentityError::Persistence(e.to_string()))
    }
}

impl std::fmt::Debug for InMemoryIdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIdentityService")
            .field("accounts", &self.account_count())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
