//! Consent prompt port
//!
//! Interactive sign-in needs the user to approve access at the identity
//! provider (a popup or a browser tab). This port runs that step and hands
//! back the provider's credential for exchange with the identity service.

use async_trait::async_trait;

use brawl_domain::SignInProvider;

use super::IdentityError;

/// Credential returned by a federated provider after consent.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ProviderCredential {
    /// OpenID Connect id token.
    pub id_token: Option<String>,
    /// OAuth access token.
    pub access_token: Option<String>,
}

impl ProviderCredential {
    /// Credential carrying an id token.
    #[must_use]
    pub fn id_token(token: impl Into<String>) -> Self {
        Self {
            id_token: Some(token.into()),
            access_token: None,
        }
    }

    /// Returns true if neither token is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id_token.is_none() && self.access_token.is_none()
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Obtains user consent at a federated provider.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Asks the user to approve sign-in with `provider`.
    ///
    /// # Errors
    ///
    /// `IdentityError::Cancelled` if the user backs out.
    async fn request_consent(
        &self,
        provider: &SignInProvider,
    ) -> Result<ProviderCredential, IdentityError>;
}
