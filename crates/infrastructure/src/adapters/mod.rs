//! Adapters for external systems.

mod reqwest_client;
mod system_clock;

pub(crate) use reqwest_client::ErrorEnvelope;
pub use reqwest_client::{PostDataError, ReqwestApiClient, build_http_client};
pub use system_clock::SystemClock;
