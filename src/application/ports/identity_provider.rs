use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{app_error::AppResult, domain::entities::identity_provider::IdentityProvider};

// ============================================================================
// Port Types
// ============================================================================

/// Account identifier assigned by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(pub String);

impl ExternalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User access token obtained from the authorization-code exchange.
#[derive(Debug)]
pub struct ProviderToken {
    pub access_token: SecretString,
}

// ============================================================================
// Port Trait
// ============================================================================

/// OAuth 2.0 (authorization code + PKCE) client and profile API for one provider.
///
/// Implementations are constructed with their credentials and callback URL and
/// passed in explicitly; nothing is registered globally.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    fn provider(&self) -> IdentityProvider;

    /// Build the URL the user agent is redirected to for consent.
    fn authorization_url(&self, state: &str, code_challenge: &str) -> AppResult<String>;

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AppResult<ProviderToken>;

    /// Resolve the account that granted `token`.
    async fn fetch_authenticated_id(&self, token: &ProviderToken) -> AppResult<ExternalId>;

    /// Public profile of `external_id`, returned exactly as the provider sent it.
    async fn fetch_profile(&self, external_id: &ExternalId) -> AppResult<serde_json::Value>;
}
