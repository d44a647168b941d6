//! In-process session cache with optional durable persistence.

use std::sync::Arc;

use parking_lot::RwLock;

use brawl_domain::{SessionCredentials, SessionHandle};

use super::{SessionNotifier, SessionWatch};
use crate::ports::{Persistence, PersistenceError, SessionPersistence};

/// Holds the current session for an identity adapter.
///
/// Every change is published to watchers. When persistence is
/// [`Persistence::Local`] and a store is configured, changes are also
/// written to the store; write failures are logged and do not undo the
/// in-memory change.
pub struct SessionCache {
    current: RwLock<Option<SessionHandle>>,
    notifier: SessionNotifier,
    store: Option<Arc<dyn SessionPersistence>>,
    persistence: RwLock<Persistence>,
}

impl SessionCache {
    /// Creates a cache that keeps sessions in memory only.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            notifier: SessionNotifier::new(),
            store: None,
            persistence: RwLock::new(Persistence::InMemory),
        }
    }

    /// Creates a cache backed by `store`.
    ///
    /// The store is only used after switching to [`Persistence::Local`].
    #[must_use]
    pub fn with_store(store: Arc<dyn SessionPersistence>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    /// The current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<SessionHandle> {
        self.current.read().clone()
    }

    /// The active persistence mode.
    #[must_use]
    pub fn persistence(&self) -> Persistence {
        *self.persistence.read()
    }

    /// Subscribes to session changes, starting with the current session.
    #[must_use]
    pub fn watch(&self) -> SessionWatch {
        let current = self.current.read();
        self.notifier.subscribe(current.clone())
    }

    /// Number of live watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.notifier.watcher_count()
    }

    /// Makes `session` the current session.
    pub async fn sign_in(&self, session: SessionHandle) {
        self.replace(Some(session.clone()));
        self.persist(&session).await;
    }

    /// Swaps in renewed credentials if `uid` is still the signed-in user.
    ///
    /// Watchers are not notified since presence does not change. Returns
    /// the updated session, or `None` if the user changed meanwhile.
    pub async fn refresh_credentials(
        &self,
        uid: &str,
        credentials: SessionCredentials,
    ) -> Option<SessionHandle> {
        let updated = {
            let mut current = self.current.write();
            let session = current.as_mut().filter(|s| s.uid == uid)?;
            session.credentials = Some(credentials);
            session.clone()
        };
        self.persist(&updated).await;
        Some(updated)
    }

    /// Clears the current session.
    pub async fn sign_out(&self) {
        self.replace(None);
        if let Some(store) = self.local_store() {
            if let Err(e) = store.clear().await {
                tracing::warn!(error = %e, "failed to clear persisted session");
            }
        }
    }

    /// Switches persistence mode.
    ///
    /// Moving to `Local` restores a stored session when none is active, or
    /// saves the active one. Moving to `InMemory` removes the stored copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub async fn set_persistence(&self, persistence: Persistence) -> Result<(), PersistenceError> {
        let Some(store) = self.store.clone() else {
            if persistence == Persistence::Local {
                return Err(PersistenceError::NoLocation);
            }
            *self.persistence.write() = persistence;
            return Ok(());
        };
        *self.persistence.write() = persistence;

        match persistence {
            Persistence::InMemory => store.clear().await,
            Persistence::Local => match self.current() {
                Some(active) => store.save(&active).await,
                None => {
                    if let Some(restored) = store.load().await? {
                        tracing::info!(uid = %restored.uid, "restored persisted session");
                        self.replace(Some(restored));
                    }
                    Ok(())
                }
            },
        }
    }

    async fn persist(&self, session: &SessionHandle) {
        if let Some(store) = self.local_store() {
            if let Err(e) = store.save(session).await {
                tracing::warn!(uid = %session.uid, error = %e, "failed to persist session");
            }
        }
    }

    fn replace(&self, session: Option<SessionHandle>) {
        let mut current = self.current.write();
        *current = session;
        self.notifier.publish(current.as_ref());
    }

    fn local_store(&self) -> Option<Arc<dyn SessionPersistence>> {
        match self.persistence() {
            Persistence::Local => self.store.clone(),
            Persistence::InMemory => None,
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("current", &self.current.read().as_ref().map(|s| &s.uid))
            .field("persistence", &self.persistence())
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}
