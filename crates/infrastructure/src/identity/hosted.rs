//! Identity service over the hosted Identity Toolkit REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::Serialize;

use brawl_application::{
    Clock, ConsentPrompt, IdentityError, IdentityService, Persistence, SessionCache,
    SessionPersistence, SessionWatch,
};
use brawl_domain::{
    PASSWORD_PROVIDER_ID, SessionHandle, SignInProvider, TOKEN_REFRESH_BUFFER_SECONDS,
};

use super::wire::{
    AuthResponse, IdpRequest, PasswordRequest, RefreshResponse, map_error_message, refresh_form,
};
use crate::adapters::ErrorEnvelope;

/// Default REST endpoint of the hosted identity service.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Default REST endpoint of the secure token service.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com";

/// Email/password and federated sign-in against the hosted identity API.
///
/// Sign-out is local: the cached session and any persisted copy are
/// dropped, tokens are not revoked. Id tokens are renewed through the
/// secure token service when [`IdentityService::id_token`] finds them
/// expired or about to expire; a refresh token the service rejects signs
/// the user out.
pub struct HostedIdentityService {
    client: Client,
    endpoint: Url,
    token_endpoint: Option<Url>,
    api_key: String,
    request_uri: String,
    clock: Arc<dyn Clock>,
    consent: Option<Arc<dyn ConsentPrompt>>,
    cache: SessionCache,
    refresh: tokio::sync::Mutex<()>,
}

impl HostedIdentityService {
    /// Creates a service for the project owning `api_key`.
    ///
    /// `request_uri` is reported to the identity API as the page that
    /// completed federated sign-in.
    #[must_use]
    pub fn new(
        client: Client,
        endpoint: Url,
        api_key: impl Into<String>,
        request_uri: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            endpoint,
            token_endpoint: None,
            api_key: api_key.into(),
            request_uri: request_uri.into(),
            clock,
            consent: None,
            cache: SessionCache::new(),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Renews id tokens at `endpoint` instead of [`DEFAULT_TOKEN_ENDPOINT`].
    #[must_use]
    pub fn with_token_endpoint(mut self, endpoint: Url) -> Self {
        self.token_endpoint = Some(endpoint);
        self
    }

    /// Persists sessions through `store` once local persistence is enabled.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionPersistence>) -> Self {
        self.cache = SessionCache::with_store(store);
        self
    }

    /// Enables interactive sign-in through `consent`.
    #[must_use]
    pub fn with_consent(mut self, consent: Arc<dyn ConsentPrompt>) -> Self {
        self.consent = Some(consent);
        self
    }

    fn method_url(&self, method: &str) -> Result<Url, IdentityError> {
        let action = format!("accounts:{method}");
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| IdentityError::Provider(format!("invalid endpoint '{}'", self.endpoint)))?
            .pop_if_empty()
            .extend(["v1", action.as_str()]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn token_url(&self) -> Result<Url, IdentityError> {
        let mut url = match &self.token_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(DEFAULT_TOKEN_ENDPOINT)
                .map_err(|e| IdentityError::Provider(e.to_string()))?,
        };
        let url_display = url.to_string();
        url.path_segments_mut()
            .map_err(|()| IdentityError::Provider(format!("invalid token endpoint '{url_display}'")))?
            .pop_if_empty()
            .extend(["v1", "token"]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Exchanges the session's refresh token for new credentials.
    async fn refresh_session(
        &self,
        session: &SessionHandle,
    ) -> Result<Option<String>, IdentityError> {
        let Some(credentials) = &session.credentials else {
            return Ok(None);
        };

        let response = self
            .client
            .post(self.token_url()?)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(refresh_form(&credentials.refresh_token))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = map_error_message(&ErrorEnvelope::message_from(&body));
            if matches!(error, IdentityError::SessionExpired(_)) {
                tracing::warn!(uid = %session.uid, error = %error, "refresh rejected, signing out");
                self.cache.sign_out().await;
            }
            return Err(error);
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("unexpected response: {e}")))?;
        if parsed.user_id() != session.uid {
            return Err(IdentityError::Provider(format!(
                "token refreshed for '{}', expected '{}'",
                parsed.user_id(),
                session.uid
            )));
        }
        let renewed = parsed.into_credentials(self.clock.now())?;

        tracing::debug!(uid = %session.uid, expires_at = %renewed.expires_at, "id token refreshed");
        Ok(self
            .cache
            .refresh_credentials(&session.uid, renewed)
            .await
            .and_then(|s| s.id_token().map(str::to_string)))
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
        fallback_provider: &str,
    ) -> Result<SessionHandle, IdentityError> {
        let url = self.method_url(method)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_message(&ErrorEnvelope::message_from(&body)));
        }

        let parsed: AuthResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("unexpected response: {e}")))?;
        let session = parsed.into_session(fallback_provider, self.clock.now())?;

        tracing::debug!(method, uid = %session.uid, "identity call succeeded");
        self.cache.sign_in(session.clone()).await;
        Ok(session)
    }
}

#[async_trait]
impl IdentityService for HostedIdentityService {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionHandle, IdentityError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signUp", &body, PASSWORD_PROVIDER_ID).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionHandle, IdentityError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("signInWithPassword", &body, PASSWORD_PROVIDER_ID)
            .await
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        self.cache.sign_out().await;
        Ok(())
    }

    fn current_session(&self) -> Option<SessionHandle> {
        self.cache.current()
    }

    async fn id_token(&self) -> Result<Option<String>, IdentityError> {
        let fresh = |session: &SessionHandle| {
            session.credentials.as_ref().and_then(|c| {
                (!c.is_expired_or_expiring(self.clock.now(), TOKEN_REFRESH_BUFFER_SECONDS))
                    .then(|| c.id_token.clone())
            })
        };

        let Some(session) = self.cache.current() else {
            return Ok(None);
        };
        if session.credentials.is_none() {
            return Ok(None);
        }
        if let Some(token) = fresh(&session) {
            return Ok(Some(token));
        }

        // One refresh at a time; a waiter may find the work already done.
        let _guard = self.refresh.lock().await;
        let Some(session) = self.cache.current() else {
            return Ok(None);
        };
        if let Some(token) = fresh(&session) {
            return Ok(Some(token));
        }
        self.refresh_session(&session).await
    }

    fn watch_session(&self) -> SessionWatch {
        self.cache.watch()
    }

    async fn interactive_sign_in(
        &self,
        provider: &SignInProvider,
    ) -> Result<SessionHandle, IdentityError> {
        let Some(consent) = &self.consent else {
            return Err(IdentityError::ProviderUnavailable(provider.to_string()));
        };

        let credential = consent.request_consent(provider).await?;
        let token = match (&credential.id_token, &credential.access_token) {
            (Some(id_token), _) => ("id_token", id_token),
            (None, Some(access_token)) => ("access_token", access_token),
            (None, None) => {
                return Err(IdentityError::Provider(format!(
                    "{} returned no credential",
                    provider.display_name()
                )));
            }
        };
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(token.0, token.1)
            .append_pair("providerId", provider.id())
            .finish();

        let body = IdpRequest {
            post_body,
            request_uri: &self.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        self.call("signInWithIdp", &body, provider.id()).await
    }

    async fn set_persistence(&self, persistence: Persistence) -> Result<(), IdentityError> {
        self.cache
            .set_persistence(persistence)
            .await
            .map_err(|e| IdentityError::Persistence(e.to_string()))
    }
}

impl std::fmt::Debug for HostedIdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedIdentityService")
            .field("endpoint", &self.endpoint.as_str())
            .field("cache", &self.cache)
            .field("interactive", &self.consent.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::SystemClock;
    use crate::persistence::MemorySessionStore;
    use brawl_application::ProviderCredential;
    use brawl_domain::{SessionCredentials, SessionEvent};
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> HostedIdentityService {
        HostedIdentityService::new(
            Client::new(),
            Url::parse(&server.uri()).unwrap(),
            "key-1",
            "https://debatebrawl.com/signin",
            Arc::new(SystemClock::new()),
        )
    }

    fn auth_body(uid: &str) -> serde_json::Value {
        json!({
            "localId": uid,
            "email": "ada@example.com",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600",
        })
    }

    fn error_body(message: &str) -> serde_json::Value {
        json!({ "error": { "code": 400, "message": message, "errors": [] } })
    }

    struct FixedConsent(ProviderCredential);

    #[async_trait]
    impl ConsentPrompt for FixedConsent {
        async fn request_consent(
            &self,
            _: &SignInProvider,
        ) -> Result<ProviderCredential, IdentityError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_create_account_signs_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .and(query_param("key", "key-1"))
            .and(body_partial_json(json!({
                "email": "ada@example.com",
                "password": "hunter22",
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("u1")))
            .expect(1)
            .mount(&server)
            .await;

        let identity = service(&server);
        let mut watch = identity.watch_session();
        assert_eq!(watch.next().await, Some(SessionEvent::SignedOut));

        let session = identity.create_account("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(session.provider_id, PASSWORD_PROVIDER_ID);
        assert_eq!(identity.current_session(), Some(session.clone()));
        assert_eq!(watch.next().await, Some(SessionEvent::SignedIn(session)));
    }

    #[tokio::test]
    async fn test_error_messages_are_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("EMAIL_EXISTS")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(error_body("INVALID_LOGIN_CREDENTIALS")),
            )
            .mount(&server)
            .await;

        let identity = service(&server);
        assert_eq!(
            identity.create_account("ada@example.com", "hunter22").await,
            Err(IdentityError::EmailInUse)
        );
        assert_eq!(
            identity.authenticate("ada@example.com", "wrong").await,
            Err(IdentityError::InvalidCredentials)
        );
        assert_eq!(identity.current_session(), None);
    }

    #[tokio::test]
    async fn test_sign_out_persists_through_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("u1")))
            .mount(&server)
            .await;

        let store = Arc::new(MemorySessionStore::new());
        let identity = service(&server).with_session_store(store.clone());
        identity.set_persistence(Persistence::Local).await.unwrap();

        identity.authenticate("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().uid, "u1");

        identity.end_session().await.unwrap();
        assert_eq!(identity.current_session(), None);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_interactive_sign_in_exchanges_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithIdp"))
            .and(body_partial_json(json!({
                "postBody": "id_token=google-token&providerId=google.com",
                "requestUri": "https://debatebrawl.com/signin",
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "g1",
                "providerId": "google.com",
                "displayName": "Ada",
                "idToken": "id-token",
                "refreshToken": "refresh-token",
                "expiresIn": "3600",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = service(&server).with_consent(Arc::new(FixedConsent(
            ProviderCredential::id_token("google-token"),
        )));
        let session = identity.interactive_sign_in(&SignInProvider::Google).await.unwrap();
        assert_eq!(session.uid, "g1");
        assert_eq!(session.provider_id, "google.com");
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_interactive_sign_in_without_prompt_is_unavailable() {
        let server = MockServer::start().await;
        let err = service(&server)
            .interactive_sign_in(&SignInProvider::Google)
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::ProviderUnavailable("google.com".into()));
    }

    async fn restored_expired(
        server: &MockServer,
    ) -> (HostedIdentityService, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&SessionHandle::new("u1", PASSWORD_PROVIDER_ID).with_credentials(
                SessionCredentials {
                    id_token: "stale".into(),
                    refresh_token: "old-refresh".into(),
                    expires_at: DateTime::UNIX_EPOCH,
                },
            ))
            .await
            .unwrap();

        let identity = service(server)
            .with_token_endpoint(Url::parse(&server.uri()).unwrap())
            .with_session_store(store.clone());
        identity.set_persistence(Persistence::Local).await.unwrap();
        assert_eq!(identity.current_session().unwrap().id_token(), Some("stale"));
        (identity, store)
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(query_param("key", "key-1"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("grant_type=refresh_token&refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "id-2",
                "expires_in": "3600",
                "token_type": "Bearer",
                "refresh_token": "new-refresh",
                "id_token": "id-2",
                "user_id": "u1",
                "project_id": "123",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (identity, store) = restored_expired(&server).await;
        assert_eq!(identity.id_token().await.unwrap().as_deref(), Some("id-2"));
        assert_eq!(identity.id_token().await.unwrap().as_deref(), Some("id-2"));

        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved.id_token(), Some("id-2"));
        assert_eq!(saved.credentials.unwrap().refresh_token, "new-refresh");
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("TOKEN_EXPIRED")))
            .mount(&server)
            .await;

        let (identity, store) = restored_expired(&server).await;
        assert_eq!(
            identity.id_token().await,
            Err(IdentityError::SessionExpired("TOKEN_EXPIRED".into()))
        );
        assert_eq!(identity.current_session(), None);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fresh_token_is_used_as_is() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("u1")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let identity = service(&server).with_token_endpoint(Url::parse(&server.uri()).unwrap());
        assert_eq!(identity.id_token().await.unwrap(), None);
        identity.authenticate("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(identity.id_token().await.unwrap().as_deref(), Some("id-token"));
    }
}
