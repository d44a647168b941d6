//! Identity service adapters.

mod hosted;
mod memory;
mod wire;

pub use hosted::{DEFAULT_IDENTITY_ENDPOINT, DEFAULT_TOKEN_ENDPOINT, HostedIdentityService};
pub use memory::{InMemoryIdentityService, MIN_PASSWORD_LENGTH};
