//! Signed-in session persisted as a JSON file.
//!
//! By default the file lives in the platform data directory:
//! - Linux: ~/.local/share/debatebrawl/session.json
//! - macOS: ~/Library/Application Support/debatebrawl/session.json
//! - Windows: %LOCALAPPDATA%/debatebrawl/session.json

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use brawl_application::ports::{PersistenceError, SessionPersistence};
use brawl_domain::SessionHandle;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const SESSION_FILE_NAME: &str = "session.json";

/// Stores one session in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location, if the platform has one.
    #[must_use]
    pub fn in_data_dir() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    /// Default session file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("debatebrawl").join(SESSION_FILE_NAME))
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionPersistence for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionHandle>, PersistenceError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session = from_json_bytes(&content)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Ok(Some(session))
    }

    async fn save(&self, session: &SessionHandle) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content =
            to_json_stable_bytes(session).map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        // Atomic replace.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
