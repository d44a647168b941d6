//! DebateBrawl Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the hosted identity and document
//! services, in-memory stand-ins, session storage and configuration.

pub mod adapters;
pub mod config;
pub mod documents;
pub mod factory;
pub mod identity;
pub mod persistence;
pub mod serialization;

pub use adapters::{PostDataError, ReqwestApiClient, SystemClock, build_http_client};
pub use crate::config::{AppConfig, BackendConfig, BackendMode, ConfigError};
pub use documents::{HostedDocumentStore, InMemoryDocumentStore};
pub use factory::BackendServiceFactory;
pub use identity::{HostedIdentityService, InMemoryIdentityService};
pub use persistence::{FileSessionStore, MemorySessionStore};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
