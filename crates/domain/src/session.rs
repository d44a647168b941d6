//! Authenticated sessions issued by the identity service.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Provider id used for email/password accounts.
pub const PASSWORD_PROVIDER_ID: &str = "password";

/// Seconds before expiry at which an id token is refreshed.
pub const TOKEN_REFRESH_BUFFER_SECONDS: i64 = 300;

/// Tokens backing a hosted session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    /// Short-lived bearer token presented to the backend.
    pub id_token: String,
    /// Long-lived token used to mint new id tokens.
    pub refresh_token: String,
    /// When `id_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl SessionCredentials {
    /// Returns true if the id token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns true if the id token has expired at `now` or will within
    /// `buffer_seconds`.
    #[must_use]
    pub fn is_expired_or_expiring(&self, now: DateTime<Utc>, buffer_seconds: i64) -> bool {
        TimeDelta::try_seconds(buffer_seconds)
            .and_then(|buffer| now.checked_add_signed(buffer))
            .is_none_or(|deadline| deadline >= self.expires_at)
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Reference to an authenticated identity.
///
/// Owned by the identity service. This layer only reads the uid and
/// profile fields; credentials are passed through to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    /// Stable user id.
    pub uid: String,
    /// Email address, if the provider shares one.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, if known.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Provider that authenticated the user (`password`, `google.com`, ...).
    pub provider_id: String,
    /// Backend credentials; absent for sessions that never left the process.
    #[serde(default)]
    pub credentials: Option<SessionCredentials>,
}

impl SessionHandle {
    /// Creates a session without credentials.
    #[must_use]
    pub fn new(uid: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            provider_id: provider_id.into(),
            credentials: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Attaches backend credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: SessionCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The bearer token for backend calls, if any.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.id_token.as_str())
    }
}

/// Presence change delivered to session watchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user is signed in.
    SignedIn(SessionHandle),
    /// No user is signed in.
    SignedOut,
}

impl SessionEvent {
    /// The session carried by the event, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&SessionHandle> {
        match self {
            Self::SignedIn(session) => Some(session),
            Self::SignedOut => None,
        }
    }
}

impl From<Option<SessionHandle>> for SessionEvent {
    fn from(value: Option<SessionHandle>) -> Self {
        value.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Federated identity provider for interactive sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInProvider {
    /// Google accounts.
    Google,
    /// Any other provider, by its backend id.
    Other(String),
}

impl SignInProvider {
    /// Backend id of the provider.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Google => "google.com",
            Self::Other(id) => id,
        }
    }

    /// Human-readable provider name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Other(id) => id,
        }
    }
}

impl fmt::Display for SignInProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
