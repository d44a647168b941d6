//! Authentication use cases for the DebateBrawl client.
//!
//! This module provides:
//! - Account registration with profile document creation
//! - Email/password login and logout
//! - The free-debate quota check

mod service;

pub use service::{AuthError, AuthService};
