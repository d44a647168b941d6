//! Session persistence port
//!
//! Durable storage for the signed-in session, so it survives restarts.

use async_trait::async_trait;

use brawl_domain::SessionHandle;

/// Errors that can occur while persisting a session.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No location is available to store the session.
    #[error("no storage location available")]
    NoLocation,
}

/// Storage for at most one session.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Loads the stored session. Returns `None` if nothing is stored.
    async fn load(&self) -> Result<Option<SessionHandle>, PersistenceError>;

    /// Replaces the stored session.
    async fn save(&self, session: &SessionHandle) -> Result<(), PersistenceError>;

    /// Removes the stored session. Succeeds if nothing was stored.
    async fn clear(&self) -> Result<(), PersistenceError>;
}
