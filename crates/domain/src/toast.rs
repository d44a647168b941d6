//! Toast messages and the redirect URLs that carry them.
//!
//! A screen that finishes an action redirects to another screen with the
//! message encoded in the query string. The receiving screen parses the
//! parameters back and shows a toast, so the layout produced here is a
//! contract:
//!
//! ```text
//! <path>?<name key>=<name>[&<description key>=<description>][&disable_button=true][&<extra>]
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Query parameter set when the destination should disable its action button.
pub const DISABLE_BUTTON_PARAM: &str = "disable_button=true";

/// Which family of query keys a redirect uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    /// `status` / `status_description`.
    Status,
    /// `error` / `error_description`.
    Error,
}

impl ToastKind {
    /// Query key carrying the toast name.
    #[must_use]
    pub const fn name_key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Error => "error",
        }
    }

    /// Query key carrying the toast description.
    #[must_use]
    pub const fn description_key(self) -> &'static str {
        match self {
            Self::Status => "status_description",
            Self::Error => "error_description",
        }
    }
}

impl FromStr for ToastKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(Self::Status),
            "error" => Ok(Self::Error),
            other => Err(DomainError::UnknownToastKind(other.to_string())),
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_key())
    }
}

/// Percent-encodes a query component the way browsers' `encodeURIComponent`
/// does: `A-Z a-z 0-9 - _ . ! ~ * ' ( )` are left as is.
#[must_use]
pub fn encode_uri_component(value: &str) -> String {
    const KEPT: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];

    let encoded = urlencoding::encode(value).into_owned();
    if !encoded.contains('%') {
        return encoded;
    }
    KEPT.iter()
        .fold(encoded, |acc, &(escaped, raw)| acc.replace(escaped, raw))
}

/// Builds a redirect URL carrying a toast of the given kind.
///
/// `name` and `description` are percent-encoded; `extra_params` is appended
/// verbatim and must already be encoded. Empty `description` and
/// `extra_params` are omitted.
#[must_use]
pub fn get_toast_redirect(
    path: &str,
    kind: ToastKind,
    name: &str,
    description: &str,
    disable_button: bool,
    extra_params: &str,
) -> String {
    let mut redirect = format!(
        "{path}?{}={}",
        kind.name_key(),
        encode_uri_component(name)
    );

    if !description.is_empty() {
        redirect.push('&');
        redirect.push_str(kind.description_key());
        redirect.push('=');
        redirect.push_str(&encode_uri_component(description));
    }

    if disable_button {
        redirect.push('&');
        redirect.push_str(DISABLE_BUTTON_PARAM);
    }

    if !extra_params.is_empty() {
        redirect.push('&');
        redirect.push_str(extra_params);
    }

    redirect
}

/// Redirect URL carrying a status toast.
#[must_use]
pub fn get_status_redirect(
    path: &str,
    status_name: &str,
    status_description: &str,
    disable_button: bool,
    extra_params: &str,
) -> String {
    get_toast_redirect(
        path,
        ToastKind::Status,
        status_name,
        status_description,
        disable_button,
        extra_params,
    )
}

/// Redirect URL carrying an error toast.
#[must_use]
pub fn get_error_redirect(
    path: &str,
    error_name: &str,
    error_description: &str,
    disable_button: bool,
    extra_params: &str,
) -> String {
    get_toast_redirect(
        path,
        ToastKind::Error,
        error_name,
        error_description,
        disable_button,
        extra_params,
    )
}

/// Severity of an on-screen notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastStatus {
    /// Neutral information.
    Info,
    /// An action succeeded.
    Success,
    /// Something needs attention.
    Warning,
    /// An action failed.
    Error,
}

/// A transient on-screen notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Severity.
    pub status: ToastStatus,
    /// How long the toast stays visible.
    pub duration: Duration,
    /// Whether the user can dismiss it early.
    pub closable: bool,
}

impl Toast {
    /// Default display time.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

    /// A closable error toast shown for the default duration.
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: ToastStatus::Error,
            duration: Self::DEFAULT_DURATION,
            closable: true,
        }
    }
}
