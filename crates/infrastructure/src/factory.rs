//! Concrete service construction for each backend mode.

use std::sync::Arc;

use reqwest::{Client, Url};

use brawl_application::{
    AppHandle, BootstrapError, Clock, ConsentPrompt, DocumentStore, IdentityService,
    ServiceFactory, SessionPersistence,
};

use crate::adapters::{SystemClock, build_http_client};
use crate::config::{AppConfig, BackendMode, ConfigError};
use crate::documents::{HostedDocumentStore, InMemoryDocumentStore};
use crate::identity::{HostedIdentityService, InMemoryIdentityService};
use crate::persistence::{FileSessionStore, MemorySessionStore};

/// Application name reported to the backend.
pub const APP_NAME: &str = "debatebrawl";

/// Project id used by the in-memory backend.
pub const LOCAL_PROJECT_ID: &str = "local";

/// Builds services from [`AppConfig`].
pub struct BackendServiceFactory {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    consent: Option<Arc<dyn ConsentPrompt>>,
    client: Client,
}

impl BackendServiceFactory {
    /// Creates a factory using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `Service` if the HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Self, BootstrapError> {
        let client = build_http_client().map_err(|e| BootstrapError::Service {
            service: "http",
            message: e.to_string(),
        })?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock::new()),
            consent: None,
            client,
        })
    }

    /// Uses `clock` for session expiry times.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enables interactive sign-in on the hosted backend.
    #[must_use]
    pub fn with_consent(mut self, consent: Arc<dyn ConsentPrompt>) -> Self {
        self.consent = Some(consent);
        self
    }

    /// The configuration services are built from.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    fn session_store(&self) -> Result<Arc<dyn SessionPersistence>, BootstrapError> {
        let store = match &self.config.backend.session_file {
            Some(path) => FileSessionStore::new(path),
            None => FileSessionStore::in_data_dir().ok_or_else(|| {
                BootstrapError::Config("no data directory for the session file".into())
            })?,
        };
        tracing::debug!(path = %store.path().display(), "using session file");
        Ok(Arc::new(store))
    }
}

fn config_error(e: ConfigError) -> BootstrapError {
    BootstrapError::Config(e.to_string())
}

fn endpoint(raw: &str, service: &'static str) -> Result<Url, BootstrapError> {
    Url::parse(raw).map_err(|e| BootstrapError::Service {
        service,
        message: format!("invalid endpoint '{raw}': {e}"),
    })
}

impl ServiceFactory for BackendServiceFactory {
    fn create_app(&self) -> Result<AppHandle, BootstrapError> {
        let backend = &self.config.backend;
        match backend.mode {
            BackendMode::Memory => Ok(AppHandle::new(APP_NAME, LOCAL_PROJECT_ID)),
            BackendMode::Hosted => {
                backend.require_api_key().map_err(config_error)?;
                let project_id = backend.require_project_id().map_err(config_error)?;
                Ok(AppHandle::new(APP_NAME, project_id))
            }
        }
    }

    fn create_identity(&self, _: &AppHandle) -> Result<Arc<dyn IdentityService>, BootstrapError> {
        let backend = &self.config.backend;
        match backend.mode {
            BackendMode::Memory => Ok(Arc::new(
                InMemoryIdentityService::new()
                    .with_session_store(Arc::new(MemorySessionStore::new())),
            )),
            BackendMode::Hosted => {
                let api_key = backend.require_api_key().map_err(config_error)?;
                let mut identity = HostedIdentityService::new(
                    self.client.clone(),
                    endpoint(&backend.identity_endpoint, "identity")?,
                    api_key,
                    self.config.urls().base_url(),
                    self.clock.clone(),
                )
                .with_token_endpoint(endpoint(&backend.token_endpoint, "token")?)
                .with_session_store(self.session_store()?);
                if let Some(consent) = &self.consent {
                    identity = identity.with_consent(consent.clone());
                }
                Ok(Arc::new(identity))
            }
        }
    }

    fn create_documents(
        &self,
        app: &AppHandle,
        identity: Arc<dyn IdentityService>,
    ) -> Result<Arc<dyn DocumentStore>, BootstrapError> {
        let backend = &self.config.backend;
        match backend.mode {
            BackendMode::Memory => Ok(Arc::new(InMemoryDocumentStore::new())),
            BackendMode::Hosted => {
                let mut store = HostedDocumentStore::new(
                    self.client.clone(),
                    endpoint(&backend.firestore_endpoint, "documents")?,
                    app.project_id.clone(),
                    identity,
                );
                if let Ok(key) = backend.require_api_key() {
                    store = store.with_api_key(key);
                }
                Ok(Arc::new(store))
            }
        }
    }
}

impl std::fmt::Debug for BackendServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendServiceFactory")
            .field("mode", &self.config.backend.mode)
            .field("interactive", &self.consent.is_some())
            .finish_non_exhaustive()
    }
}
