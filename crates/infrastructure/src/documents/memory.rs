//! Process-local document store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use brawl_application::{DocumentError, DocumentStore};
use brawl_domain::Fields;

/// Document store that keeps everything in a map.
///
/// Writes replace the whole document, matching the hosted store.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Fields>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<(), DocumentError> {
        self.documents
            .write()
            .insert((collection.to_string(), id.to_string()), fields.clone());
        Ok(())
    }

    async fn read_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Fields>, DocumentError> {
        Ok(self
            .documents
            .read()
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use brawl_domain::FieldValue;

    #[tokio::test]
    async fn test_write_replaces_and_read_is_scoped_by_collection() {
        let store = InMemoryDocumentStore::new();
        let first = Fields::from([("a".to_string(), FieldValue::Integer(1))]);
        let second = Fields::from([("b".to_string(), FieldValue::Integer(2))]);

        store.write_document("users", "u1", &first).await.unwrap();
        store.write_document("users", "u1", &second).await.unwrap();

        assert_eq!(store.read_document("users", "u1").await.unwrap(), Some(second));
        assert_eq!(store.read_document("debates", "u1").await.unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
