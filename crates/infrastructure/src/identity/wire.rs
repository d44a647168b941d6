//! Request and response bodies of the Identity Toolkit REST API.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use brawl_application::IdentityError;
use brawl_domain::{SessionCredentials, SessionHandle};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequest<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IdpRequest<'a> {
    pub(super) post_body: String,
    pub(super) request_uri: &'a str,
    pub(super) return_secure_token: bool,
    pub(super) return_idp_credential: bool,
}

/// Fields shared by the sign-up and sign-in responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
    #[serde(default)]
    provider_id: Option<String>,
}

impl AuthResponse {
    /// Converts the response into a session issued at `now`.
    pub(super) fn into_session(
        self,
        fallback_provider: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionHandle, IdentityError> {
        let expires_at = expiry(&self.expires_in, now)?;
        let mut session = SessionHandle::new(
            self.local_id,
            self.provider_id.as_deref().unwrap_or(fallback_provider),
        )
        .with_credentials(SessionCredentials {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at,
        });
        session.email = self.email.filter(|e| !e.is_empty());
        session.display_name = self.display_name.filter(|n| !n.is_empty());
        Ok(session)
    }
}

/// Response of the secure token service's `refresh_token` grant.
#[derive(Debug, Deserialize)]
pub(super) struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

impl RefreshResponse {
    /// Uid the renewed tokens belong to.
    pub(super) fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Converts the response into credentials issued at `now`.
    pub(super) fn into_credentials(
        self,
        now: DateTime<Utc>,
    ) -> Result<SessionCredentials, IdentityError> {
        Ok(SessionCredentials {
            expires_at: expiry(&self.expires_in, now)?,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        })
    }
}

/// Form body of a `refresh_token` grant.
pub(super) fn refresh_form(refresh_token: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .finish()
}

/// Instant `expires_in` seconds after `now`.
fn expiry(expires_in: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, IdentityError> {
    expires_in
        .parse::<i64>()
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| IdentityError::Provider(format!("invalid expiresIn '{expires_in}'")))
}

/// Maps an Identity Toolkit error message to a typed error.
///
/// Messages look like `CODE` or `CODE : detail`.
pub(super) fn map_error_message(message: &str) -> IdentityError {
    let (code, detail) = message
        .split_once(" : ")
        .map_or((message.trim(), ""), |(c, d)| (c.trim(), d.trim()));

    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(detail.to_string()),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "USER_DISABLED" => IdentityError::AccountDisabled,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            IdentityError::SessionExpired(code.to_string())
        }
        _ => IdentityError::Provider(message.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        assert_eq!(map_error_message("EMAIL_EXISTS"), IdentityError::EmailInUse);
        assert_eq!(
            map_error_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::WeakPassword("Password should be at least 6 characters".into())
        );
        assert_eq!(
            map_error_message("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        );
        assert_eq!(map_error_message("USER_DISABLED"), IdentityError::AccountDisabled);
        assert_eq!(
            map_error_message("TOKEN_EXPIRED"),
            IdentityError::SessionExpired("TOKEN_EXPIRED".into())
        );
        assert_eq!(
            map_error_message("TOO_MANY_ATTEMPTS_TRY_LATER : Try again later"),
            IdentityError::Provider("TOO_MANY_ATTEMPTS_TRY_LATER : Try again later".into())
        );
    }

    #[test]
    fn test_response_into_session() {
        let response: AuthResponse = serde_json::from_str(
            r#"{
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "u1",
                "email": "ada@example.com",
                "displayName": "",
                "idToken": "id",
                "refreshToken": "refresh",
                "expiresIn": "3600",
                "registered": true
            }"#,
        )
        .unwrap();

        let now = DateTime::UNIX_EPOCH;
        let session = response.into_session("password", now).unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(session.provider_id, "password");
        assert_eq!(session.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.display_name, None);
        assert_eq!(session.id_token(), Some("id"));
        assert_eq!(
            session.credentials.unwrap().expires_at,
            now + TimeDelta::seconds(3600)
        );
    }

    #[test]
    fn test_oversized_lifetime_is_rejected() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "localId": "u1",
            "idToken": "id",
            "refreshToken": "refresh",
            "expiresIn": "9223372036854775",
        }))
        .unwrap();

        let err = response.into_session("password", Utc::now()).unwrap_err();
        assert!(matches!(err, IdentityError::Provider(m) if m.contains("expiresIn")));
    }

    #[test]
    fn test_refresh_response_into_credentials() {
        let response: RefreshResponse = serde_json::from_value(serde_json::json!({
            "access_token": "id-2",
            "expires_in": "3600",
            "token_type": "Bearer",
            "refresh_token": "refresh-2",
            "id_token": "id-2",
            "user_id": "u1",
            "project_id": "123",
        }))
        .unwrap();
        assert_eq!(response.user_id(), "u1");

        let now = DateTime::UNIX_EPOCH;
        let credentials = response.into_credentials(now).unwrap();
        assert_eq!(credentials.id_token, "id-2");
        assert_eq!(credentials.refresh_token, "refresh-2");
        assert_eq!(credentials.expires_at, now + TimeDelta::seconds(3600));
    }

    #[test]
    fn test_refresh_form_is_urlencoded() {
        assert_eq!(
            refresh_form("a/b+c"),
            "grant_type=refresh_token&refresh_token=a%2Fb%2Bc"
        );
    }
}
