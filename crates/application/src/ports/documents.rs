//! Document store port

use async_trait::async_trait;
use thiserror::Error;

use brawl_domain::Fields;

/// Errors raised by the document store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The caller may not access the document.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The stored representation could not be converted.
    #[error("document codec error: {0}")]
    Codec(String),

    /// The store answered with an unexpected error.
    #[error("document store error ({status}): {message}")]
    Backend {
        /// HTTP-style status code.
        status: u16,
        /// Message from the store.
        message: String,
    },
}

/// Port to the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes (creates or replaces) a document.
    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<(), DocumentError>;

    /// Reads a document. Returns `None` if it does not exist.
    async fn read_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Fields>, DocumentError>;
}
