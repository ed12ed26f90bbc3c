//! Twitter/X OAuth 2.0 (authorization code + PKCE) and user lookup.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::error;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::identity_provider::{ExternalId, IdentityProviderClient, ProviderToken},
    domain::entities::identity_provider::IdentityProvider,
};

const AUTHORIZE_URL: &str = "https://twitter.com/i/oauth2/authorize";
const API_BASE_URL: &str = "https://api.twitter.com";
const SCOPES: &str = "tweet.read users.read";
const PROFILE_FIELDS: &str =
    "created_at,description,location,profile_image_url,public_metrics,url,verified";

pub struct TwitterClient {
    http: Client,
    client_id: String,
    client_secret: SecretString,
    callback_url: Url,
    bearer_token: SecretString,
    authorize_url: Url,
    api_base_url: Url,
}

#[derive(Deserialize)]
struct TwitterTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TwitterUserEnvelope {
    data: TwitterUser,
}

#[derive(Deserialize)]
struct TwitterUser {
    id: String,
}

impl TwitterClient {
    pub fn new(
        http: Client,
        client_id: String,
        client_secret: SecretString,
        callback_url: Url,
        bearer_token: SecretString,
    ) -> AppResult<Self> {
        let authorize_url = Url::parse(AUTHORIZE_URL)
            .map_err(|e| AppError::Internal(format!("Invalid authorize URL: {e}")))?;
        let api_base_url = Url::parse(API_BASE_URL)
            .map_err(|e| AppError::Internal(format!("Invalid API base URL: {e}")))?;
        Ok(Self {
            http,
            client_id,
            client_secret,
            callback_url,
            bearer_token,
            authorize_url,
            api_base_url,
        })
    }

    /// Point the client at a different API host (used against local fakes).
    pub fn with_api_base_url(mut self, api_base_url: Url) -> Self {
        self.api_base_url = api_base_url;
        self
    }

    fn api_url(&self, path: &str) -> AppResult<Url> {
        self.api_base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid Twitter API path {path}: {e}")))
    }

    /// `/2/users/{id}` with the id pushed as a single encoded segment.
    fn profile_url(&self, external_id: &ExternalId) -> AppResult<Url> {
        let mut url = self.api_url("/2/users")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Twitter API base URL cannot carry a path".into()))?
            .push(external_id.as_str());
        url.query_pairs_mut().append_pair("user.fields", PROFILE_FIELDS);
        Ok(url)
    }
}

#[async_trait]
impl IdentityProviderClient for TwitterClient {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Twitter
    }

    fn authorization_url(&self, state: &str, code_challenge: &str) -> AppResult<String> {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.callback_url.as_str())
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AppResult<ProviderToken> {
        let response = self
            .http
            .post(self.api_url("/2/oauth2/token")?)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.callback_url.as_str()),
                ("code_verifier", code_verifier),
                ("client_id", self.client_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Twitter token exchange request failed");
                AppError::Provider(format!("Network error during OAuth: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // A rejected code (expired, reused, wrong verifier) means the user is not authenticated.
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                tracing::warn!(status = status.as_u16(), body = %body, "Twitter rejected authorization code");
                return Err(AppError::InvalidCredentials);
            }
            return Err(provider_error("token exchange", status, &body));
        }

        let token = response
            .json::<TwitterTokenResponse>()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse token response: {e}")))?;

        Ok(ProviderToken {
            access_token: SecretString::new(token.access_token.into()),
        })
    }

    async fn fetch_authenticated_id(&self, token: &ProviderToken) -> AppResult<ExternalId> {
        let response = self
            .http
            .get(self.api_url("/2/users/me")?)
            .bearer_auth(token.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to fetch Twitter account: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error("account lookup", status, &body));
        }

        let envelope = response
            .json::<TwitterUserEnvelope>()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Twitter account: {e}")))?;

        Ok(ExternalId::new(envelope.data.id))
    }

    async fn fetch_profile(&self, external_id: &ExternalId) -> AppResult<serde_json::Value> {
        let url = self.profile_url(external_id)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer_token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to fetch Twitter profile: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error("profile lookup", status, &body));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Twitter profile: {e}")))
    }
}

fn provider_error(operation: &str, status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error_description")
                .or_else(|| value.get("detail"))
                .or_else(|| value.get("title"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    error!(operation, status = status.as_u16(), detail = %detail, "Twitter API error");
    AppError::Provider(format!("Twitter {operation} failed ({}): {detail}", status.as_u16()))
}
