//! Document store adapters.

pub mod codec;
mod hosted;
mod memory;

pub use hosted::{DEFAULT_FIRESTORE_ENDPOINT, HostedDocumentStore};
pub use memory::InMemoryDocumentStore;
