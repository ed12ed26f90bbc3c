use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::identity_provider::IdentityProviderClient,
        use_cases::access_registry::UserRepo,
        validators::normalize_email,
    },
    domain::entities::identity_provider::IdentityProvider,
};

/// Handshake data kept between the start request and the provider callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthStateData {
    pub email: String,
    pub provider: IdentityProvider,
    pub code_verifier: String,
}

#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    async fn store_state(
        &self,
        state: &str,
        data: &OAuthStateData,
        ttl_minutes: i64,
    ) -> AppResult<()>;
    /// Atomically fetch and delete. A state can be consumed at most once.
    async fn consume_state(&self, state: &str) -> AppResult<Option<OAuthStateData>>;
}

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct IdentityLinkUseCases {
    repo: Arc<dyn UserRepo>,
    states: Arc<dyn OAuthStateStore>,
    identity: Arc<dyn IdentityProviderClient>,
    app_redirect_url: Url,
    state_ttl_minutes: i64,
}

impl IdentityLinkUseCases {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        states: Arc<dyn OAuthStateStore>,
        identity: Arc<dyn IdentityProviderClient>,
        app_redirect_url: Url,
        state_ttl_minutes: i64,
    ) -> Self {
        Self {
            repo,
            states,
            identity,
            app_redirect_url,
            state_ttl_minutes,
        }
    }

    /// Start the OAuth handshake for a whitelisted email and return the consent URL.
    #[instrument(skip(self))]
    pub async fn begin(&self, provider: IdentityProvider, email: &str) -> AppResult<String> {
        self.ensure_supported(provider)?;
        let email = normalize_email(email)?;

        let whitelisted = self
            .repo
            .get_by_email(&email)
            .await?
            .is_some_and(|user| user.has_access);
        if !whitelisted {
            return Err(AppError::NotWhitelisted);
        }

        let state = generate_token();
        let code_verifier = generate_token();
        let code_challenge = pkce_challenge(&code_verifier);

        let data = OAuthStateData {
            email,
            provider,
            code_verifier,
        };
        self.states
            .store_state(&state, &data, self.state_ttl_minutes)
            .await?;

        self.identity.authorization_url(&state, &code_challenge)
    }

    /// Finish the handshake and build the app redirect carrying the external id.
    ///
    /// The state is consumed before anything else is checked, so a callback
    /// reporting a provider error still invalidates it. The user record is not
    /// written here; the app links the id through `connect-identity`.
    #[instrument(skip(self, params), fields(has_code = params.code.is_some()))]
    pub async fn complete(
        &self,
        provider: IdentityProvider,
        params: &CallbackParams,
    ) -> AppResult<Url> {
        self.ensure_supported(provider)?;

        let state = params
            .state
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;
        let data = self
            .states
            .consume_state(state)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if data.provider != provider {
            return Err(AppError::InvalidCredentials);
        }
        if let Some(error) = &params.error {
            tracing::warn!(provider = %provider, error = %error, "Provider denied authorization");
            return Err(AppError::InvalidCredentials);
        }
        let code = params.code.as_deref().ok_or(AppError::InvalidCredentials)?;

        let token = self.identity.exchange_code(code, &data.code_verifier).await?;
        let external_id = self.identity.fetch_authenticated_id(&token).await?;

        let mut redirect = self.app_redirect_url.clone();
        redirect
            .query_pairs_mut()
            .append_pair(external_id_param(provider), external_id.as_str());

        tracing::info!(
            provider = %provider,
            email = %data.email,
            external_id = %external_id,
            "OAuth handshake completed"
        );

        Ok(redirect)
    }

    fn ensure_supported(&self, provider: IdentityProvider) -> AppResult<()> {
        if provider == self.identity.provider() {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

fn external_id_param(provider: IdentityProvider) -> &'static str {
    match provider {
        IdentityProvider::Twitter => "twitterId",
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for a PKCE verifier.
pub fn pkce_challenge(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}
