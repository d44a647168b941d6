//! Client configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional TOML file (`brawl.toml` unless another path is given)
//! 3. `BRAWL_*` environment variables, `__` separating nested keys
//!    (`BRAWL_SITE_URL`, `BRAWL_BACKEND__API_KEY`, ...)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use brawl_domain::SiteConfig;

use crate::documents::DEFAULT_FIRESTORE_ENDPOINT;
use crate::identity::{DEFAULT_IDENTITY_ENDPOINT, DEFAULT_TOKEN_ENDPOINT};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "brawl.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "BRAWL";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or the values could not be deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required setting is missing.
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
}

/// Which backend the services talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The hosted identity and document services.
    Hosted,
    /// Process-local services; nothing leaves the machine.
    #[default]
    Memory,
}

/// Settings for the identity and document backends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend selection.
    pub mode: BackendMode,
    /// Public API key of the hosted project.
    pub api_key: Option<String>,
    /// Hosted project id.
    pub project_id: Option<String>,
    /// Identity REST endpoint.
    pub identity_endpoint: String,
    /// Secure token endpoint used to renew id tokens.
    pub token_endpoint: String,
    /// Document REST endpoint.
    pub firestore_endpoint: String,
    /// Where the signed-in session is stored; platform data dir if unset.
    pub session_file: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            api_key: None,
            project_id: None,
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            session_file: None,
        }
    }
}

impl BackendConfig {
    /// The API key, or `Missing` if unset or blank.
    ///
    /// # Errors
    ///
    /// Returns `Missing("backend.api_key")`.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_blank(self.api_key.as_deref()).ok_or(ConfigError::Missing("backend.api_key"))
    }

    /// The project id, or `Missing` if unset or blank.
    ///
    /// # Errors
    ///
    /// Returns `Missing("backend.project_id")`.
    pub fn require_project_id(&self) -> Result<&str, ConfigError> {
        non_blank(self.project_id.as_deref()).ok_or(ConfigError::Missing("backend.project_id"))
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Canonical public URL of the site.
    pub site_url: Option<String>,
    /// URL assigned to this deployment by the hosting platform.
    pub deployment_url: Option<String>,
    /// Backend settings.
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Loads configuration from `file` (or [`DEFAULT_CONFIG_FILE`]) and the
    /// process environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(file, None)
    }

    /// Like [`Self::load`], but reads variables from `env` instead of the
    /// process environment when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let (file, required) = file.map_or_else(
            || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
            |path| (path.to_path_buf(), true),
        );

        let settings = config::Config::builder()
            .add_source(config::File::from(file).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        tracing::debug!(mode = ?config.backend.mode, "configuration loaded");
        Ok(config)
    }

    /// Site settings used to build absolute URLs.
    #[must_use]
    pub fn urls(&self) -> SiteConfig {
        SiteConfig {
            site_url: self.site_url.clone(),
            deployment_url: self.deployment_url.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AppConfig::load_from(Some(&missing), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));

        let config = AppConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Memory);
        assert_eq!(config.backend.identity_endpoint, DEFAULT_IDENTITY_ENDPOINT);
        assert_eq!(config.backend.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(config.urls().base_url(), "https://localhost:3000");
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("brawl.toml");
        std::fs::write(
            &path,
            r#"
site_url = "debatebrawl.com"

[backend]
mode = "hosted"
api_key = "file-key"
project_id = "brawl-prod"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(&path),
            env(&[
                ("BRAWL_BACKEND__API_KEY", "env-key"),
                ("BRAWL_DEPLOYMENT_URL", "brawl-git-main.vercel.app"),
                ("BRAWL_BACKEND__SESSION_FILE", "/tmp/brawl-session.json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.backend.mode, BackendMode::Hosted);
        assert_eq!(config.backend.require_api_key().unwrap(), "env-key");
        assert_eq!(config.backend.require_project_id().unwrap(), "brawl-prod");
        assert_eq!(config.deployment_url.as_deref(), Some("brawl-git-main.vercel.app"));
        assert_eq!(config.urls().url_for("/dashboard"), "https://debatebrawl.com/dashboard");
        assert_eq!(
            config.backend.session_file,
            Some(PathBuf::from("/tmp/brawl-session.json"))
        );
    }

    #[test]
    fn test_env_site_url_reaches_url_builder() {
        let config = AppConfig::load_from(
            None,
            env(&[("BRAWL_SITE_URL", "https://brawl.example/")]),
        )
        .unwrap();
        assert_eq!(config.site_url.as_deref(), Some("https://brawl.example/"));
        assert_eq!(config.urls().url_for("signin"), "https://brawl.example/signin");
    }

    #[test]
    fn test_blank_required_setting_is_missing() {
        let backend = BackendConfig {
            api_key: Some("  ".into()),
            ..BackendConfig::default()
        };
        assert!(matches!(
            backend.require_api_key(),
            Err(ConfigError::Missing("backend.api_key"))
        ));
        assert!(matches!(
            backend.require_project_id(),
            Err(ConfigError::Missing("backend.project_id"))
        ));
    }
}
