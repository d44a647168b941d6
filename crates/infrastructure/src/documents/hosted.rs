//! Document store over the hosted document database REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use brawl_application::{DocumentError, DocumentStore, IdentityError, IdentityService};
use brawl_domain::Fields;

use super::codec::{decode_fields, encode_fields};
use crate::adapters::ErrorEnvelope;

/// Default REST endpoint of the hosted document database.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

#[derive(Debug, Deserialize)]
struct DocumentBody {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Reads and writes documents of one project.
///
/// Requests are authorized with the id token of the identity service's
/// current session, if there is one. The identity service renews the
/// token first when it is about to expire.
pub struct HostedDocumentStore {
    client: Client,
    endpoint: Url,
    project_id: String,
    api_key: Option<String>,
    identity: Arc<dyn IdentityService>,
}

impl HostedDocumentStore {
    /// Creates a store for `project_id` at `endpoint`.
    #[must_use]
    pub fn new(
        client: Client,
        endpoint: Url,
        project_id: impl Into<String>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        Self {
            client,
            endpoint,
            project_id: project_id.into(),
            api_key: None,
            identity,
        }
    }

    /// Sends the API key with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// URL of `collection/id`, carrying the API key as `key` when set.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the endpoint cannot carry a path.
    pub fn document_url(&self, collection: &str, id: &str) -> Result<Url, DocumentError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| DocumentError::Backend {
                status: 0,
                message: format!("endpoint '{}' cannot be a base URL", self.endpoint),
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
                id,
            ]);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, DocumentError> {
        match self.identity.id_token().await {
            Ok(Some(token)) => Ok(request.bearer_auth(token)),
            Ok(None) => Ok(request),
            Err(IdentityError::Network(message)) => Err(DocumentError::Network(message)),
            Err(e) => Err(DocumentError::PermissionDenied(e.to_string())),
        }
    }

    async fn failure(response: Response) -> DocumentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = ErrorEnvelope::message_from(&body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DocumentError::PermissionDenied(message)
            }
            _ => DocumentError::Backend {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn network(e: &reqwest::Error) -> DocumentError {
    DocumentError::Network(e.to_string())
}

#[async_trait]
impl DocumentStore for HostedDocumentStore {
    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<(), DocumentError> {
        let url = self.document_url(collection, id)?;
        let body = json!({ "fields": encode_fields(fields) });

        let response = self
            .authorize(self.client.patch(url))
            .await?
            .json(&body)
            .send()
            .await
            .map_err(|e| network(&e))?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        tracing::debug!(collection, id, "document written");
        Ok(())
    }

    async fn read_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Fields>, DocumentError> {
        let url = self.document_url(collection, id)?;

        let response = self
            .authorize(self.client.get(url))
            .await?
            .send()
            .await
            .map_err(|e| network(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let document: DocumentBody = response
                    .json()
                    .await
                    .map_err(|e| DocumentError::Codec(e.to_string()))?;
                decode_fields(&document.fields).map(Some)
            }
            _ => Err(Self::failure(response).await),
        }
    }
}

impl std::fmt::Debug for HostedDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedDocumentStore")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
