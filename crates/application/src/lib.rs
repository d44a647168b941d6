//! DebateBrawl Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (identity service, document store, session persistence, ...)
//! - Session watch subscriptions
//! - Auth use cases and service bootstrap
//! - The sign-in screen controller
//! - Application-level error handling

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod ports;
pub mod screens;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use bootstrap::{AppHandle, BootstrapError, Bootstrapper, RuntimeContext, ServiceContext, ServiceFactory};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    Clock, ConsentPrompt, DocumentError, DocumentStore, IdentityError, IdentityService, Navigator,
    Notifier, Persistence, PersistenceError, ProviderCredential, SessionPersistence,
};
pub use screens::{SignInScreen, SignInView, redirect_target};
pub use session::{SessionCache, SessionNotifier, SessionWatch, Unsubscribe};
