//! HTTP plumbing shared by the hosted adapters, and the site API client.
//!
//! [`ReqwestApiClient::post_data`] talks to the site's own API routes;
//! relative paths resolve against the configured site base so calls stay
//! on the same origin.

use reqwest::{Client, Url, header};
use serde::Deserialize;
use thiserror::Error;

use brawl_domain::SiteConfig;

const USER_AGENT: &str = concat!("DebateBrawl/", env!("CARGO_PKG_VERSION"));

/// Errors from [`ReqwestApiClient::post_data`].
#[derive(Debug, Error)]
pub enum PostDataError {
    /// The URL could not be parsed or resolved.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The request did not complete.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body is not JSON.
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Builds the reqwest client used by every adapter.
///
/// # Errors
///
/// Returns the reqwest error if the TLS backend cannot be initialised.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// Error envelope returned by the hosted REST APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: String,
}

impl ErrorEnvelope {
    /// Best-effort extraction of the error message from a response body.
    pub(crate) fn message_from(body: &str) -> String {
        serde_json::from_str::<Self>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string())
    }
}

/// Client for the site's JSON API routes.
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: Client,
    site: SiteConfig,
}

impl ReqwestApiClient {
    /// Creates a client bound to `site`.
    ///
    /// # Errors
    ///
    /// Returns `Client` if the HTTP client cannot be created.
    pub fn new(site: SiteConfig) -> Result<Self, PostDataError> {
        let client = build_http_client().map_err(|e| PostDataError::Client(e.to_string()))?;
        Ok(Self { client, site })
    }

    /// Creates a client around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, site: SiteConfig) -> Self {
        Self { client, site }
    }

    /// Resolves `url` to an absolute URL.
    ///
    /// Absolute URLs are used as-is; anything else is taken as a path on
    /// the site base.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the result is not a valid URL.
    pub fn resolve(&self, url: &str) -> Result<Url, PostDataError> {
        let invalid = |e: url::ParseError| PostDataError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        };

        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&self.site.url_for(url)).map_err(invalid)
            }
            Err(e) => Err(invalid(e)),
        }
    }

    /// POSTs to `url` with a JSON content type and no body, returning the
    /// parsed JSON response.
    ///
    /// The HTTP status is not inspected; error statuses with JSON bodies
    /// are returned like any other response.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, or the
    /// body is not JSON.
    pub async fn post_data(&self, url: &str) -> Result<serde_json::Value, PostDataError> {
        let target = self.resolve(url)?;

        let response = self
            .client
            .post(target)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| PostDataError::Transport(e.to_string()))
            .inspect_err(|e| tracing::error!(url, error = %e, "post_data request failed"))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PostDataError::Transport(e.to_string()))?;
        tracing::debug!(url, status = status.as_u16(), "post_data response");

        serde_json::from_slice(&body).map_err(|e| PostDataError::InvalidJson(e.to_string()))
    }
}
