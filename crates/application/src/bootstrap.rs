//! Service context bootstrap.
//!
//! The application handle, identity handle and document handle are built
//! once and then shared by cloning the [`ServiceContext`]. Construction
//! only happens in an interactive runtime; during non-interactive
//! rendering no handles exist and callers get `None`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::ports::{DocumentStore, IdentityError, IdentityService, Persistence};

/// Errors raised while building the service context.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration needed by a service is missing or invalid.
    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// A service handle could not be created.
    #[error("failed to create {service} handle: {message}")]
    Service {
        /// Which handle failed.
        service: &'static str,
        /// Underlying failure.
        message: String,
    },

    /// Session persistence could not be configured.
    #[error("failed to configure session persistence: {0}")]
    Persistence(#[from] IdentityError),
}

/// Where the code is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeContext {
    /// A user-facing session (browser, desktop, terminal).
    Interactive,
    /// Non-interactive rendering; services must not be created.
    Server,
}

impl RuntimeContext {
    /// Returns true if services may be created.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Identity of the client application towards the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppHandle {
    /// Application name.
    pub name: String,
    /// Backend project the handles talk to.
    pub project_id: String,
    /// When the handle was created.
    pub created_at: DateTime<Utc>,
}

impl AppHandle {
    /// Creates a handle stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Builds the concrete service handles.
///
/// Implemented by the infrastructure layer for each backend.
pub trait ServiceFactory: Send + Sync {
    /// Creates the application handle.
    ///
    /// # Errors
    ///
    /// Returns `Config` if required settings are missing.
    fn create_app(&self) -> Result<AppHandle, BootstrapError>;

    /// Creates the identity handle for `app`.
    ///
    /// # Errors
    ///
    /// Returns `Service` if the handle cannot be created.
    fn create_identity(&self, app: &AppHandle) -> Result<Arc<dyn IdentityService>, BootstrapError>;

    /// Creates the document handle for `app`.
    ///
    /// The identity handle is passed so the store can authorize requests
    /// as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `Service` if the handle cannot be created.
    fn create_documents(
        &self,
        app: &AppHandle,
        identity: Arc<dyn IdentityService>,
    ) -> Result<Arc<dyn DocumentStore>, BootstrapError>;
}

/// The three shared service handles.
#[derive(Clone)]
pub struct ServiceContext {
    app: Arc<AppHandle>,
    identity: Arc<dyn IdentityService>,
    documents: Arc<dyn DocumentStore>,
}

impl ServiceContext {
    /// Assembles a context from existing handles.
    #[must_use]
    pub fn from_parts(
        app: AppHandle,
        identity: Arc<dyn IdentityService>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            app: Arc::new(app),
            identity,
            documents,
        }
    }

    /// Builds a fresh context through `factory`, with local session
    /// persistence enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if any handle cannot be created or persistence
    /// cannot be configured.
    pub async fn create<F: ServiceFactory + ?Sized>(factory: &F) -> Result<Self, BootstrapError> {
        let app = factory.create_app()?;
        let identity = factory.create_identity(&app)?;
        identity.set_persistence(Persistence::Local).await?;
        let documents = factory.create_documents(&app, identity.clone())?;

        tracing::info!(app = %app.name, project = %app.project_id, "service context created");
        Ok(Self::from_parts(app, identity, documents))
    }

    /// The application handle.
    #[must_use]
    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    /// The identity handle.
    #[must_use]
    pub fn identity(&self) -> Arc<dyn IdentityService> {
        self.identity.clone()
    }

    /// The document handle.
    #[must_use]
    pub fn documents(&self) -> Arc<dyn DocumentStore> {
        self.documents.clone()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

/// Creates the service context on first use and hands out the same one
/// afterwards.
///
/// Hold one `Bootstrapper` for the life of the process (typically in the
/// entry point) and pass the resulting context to consumers.
#[derive(Debug, Default)]
pub struct Bootstrapper {
    context: OnceCell<ServiceContext>,
}

impl Bootstrapper {
    /// Creates an empty bootstrapper.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            context: OnceCell::const_new(),
        }
    }

    /// Returns the shared context, creating it on the first interactive call.
    ///
    /// In a [`RuntimeContext::Server`] runtime nothing is created and
    /// `Ok(None)` is returned. A failed creation leaves the bootstrapper
    /// empty so a later call can try again.
    ///
    /// # Errors
    ///
    /// Returns an error if the first creation fails.
    pub async fn get_or_init<F: ServiceFactory + ?Sized>(
        &self,
        runtime: RuntimeContext,
        factory: &F,
    ) -> Result<Option<ServiceContext>, BootstrapError> {
        if !runtime.is_interactive() {
            tracing::debug!("non-interactive runtime, skipping service bootstrap");
            return Ok(None);
        }

        let context = self
            .context
            .get_or_try_init(|| ServiceContext::create(factory))
            .await?;
        Ok(Some(context.clone()))
    }

    /// The context, if it has been created.
    #[must_use]
    pub fn get(&self) -> Option<&ServiceContext> {
        self.context.get()
    }
}
