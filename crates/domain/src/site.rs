//! Canonical absolute URLs for the deployed site.

use serde::{Deserialize, Serialize};

/// Base used when neither a site nor a deployment URL is configured.
pub const LOCAL_DEVELOPMENT_URL: &str = "localhost:3000/";

/// Where the site is served from.
///
/// Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical public URL of the site.
    #[serde(default)]
    pub site_url: Option<String>,
    /// URL assigned by the hosting platform to this deployment.
    #[serde(default)]
    pub deployment_url: Option<String>,
}

impl SiteConfig {
    /// Creates a config with only a site URL.
    #[must_use]
    pub fn with_site_url(url: impl Into<String>) -> Self {
        Self {
            site_url: Some(url.into()),
            deployment_url: None,
        }
    }

    /// The base URL: scheme included, trailing slashes removed.
    #[must_use]
    pub fn base_url(&self) -> String {
        let raw = non_blank(self.site_url.as_deref())
            .or_else(|| non_blank(self.deployment_url.as_deref()))
            .unwrap_or(LOCAL_DEVELOPMENT_URL);

        let trimmed = raw.trim_end_matches('/');
        if has_http_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        }
    }

    /// Absolute URL for `path` on this site.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url();
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Builds an absolute URL for `path` using the configured site.
///
/// Prefers the site URL, then the deployment URL, then
/// [`LOCAL_DEVELOPMENT_URL`]. Base and path are joined with exactly one
/// slash; a trailing slash on `path` is kept.
#[must_use]
pub fn get_url(config: &SiteConfig, path: &str) -> String {
    config.url_for(path)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
