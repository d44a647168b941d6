//! Process-local session storage.

use async_trait::async_trait;
use parking_lot::Mutex;

use brawl_application::ports::{PersistenceError, SessionPersistence};
use brawl_domain::SessionHandle;

/// Keeps the "persisted" session in memory.
///
/// Used by the in-memory backend, where nothing outlives the process
/// anyway.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<SessionHandle>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionHandle>, PersistenceError> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, session: &SessionHandle) -> Result<(), PersistenceError> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.slot.lock().take();
        Ok(())
    }
}
