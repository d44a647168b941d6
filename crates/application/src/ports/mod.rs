//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod consent;
mod documents;
mod identity;
mod navigation;
mod persistence;

pub use clock::Clock;
pub use consent::{ConsentPrompt, ProviderCredential};
pub use documents::{DocumentError, DocumentStore};
pub use identity::{IdentityError, IdentityService, Persistence};
pub use navigation::{Navigator, Notifier};
pub use persistence::{PersistenceError, SessionPersistence};
