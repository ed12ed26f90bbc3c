use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::Redirect,
    routing::{get, patch},
};
use serde::Deserialize;

use super::{EmailQuery, json_body, path_params, query_params};
use crate::{
    adapters::http::{app_state::AppState, response::ApiResponse},
    app_error::{AppError, AppResult},
    application::{use_cases::identity_link::CallbackParams, validators::require},
    domain::entities::{identity_provider::IdentityProvider, user::UserRecord},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/connect-wallet", patch(connect_wallet))
        .route("/auth/connect-identity", patch(connect_identity))
        .route("/auth/connect-twitter", patch(connect_identity))
        .route("/auth/{provider}", get(begin_handshake))
        .route("/auth/{provider}/callback", get(handshake_callback))
}

#[derive(Deserialize)]
struct ConnectWalletPayload {
    #[serde(default, rename = "pubKey")]
    pub_key: Option<String>,
}

#[derive(Deserialize)]
struct ConnectIdentityQuery {
    email: Option<String>,
    #[serde(rename = "externalId", alias = "twitterId")]
    external_id: Option<String>,
}

fn parse_provider(segment: &str) -> AppResult<IdentityProvider> {
    IdentityProvider::from_path(segment).ok_or(AppError::NotFound)
}

/// GET /auth/{provider}?email=
/// Redirects a whitelisted user to the provider's consent page.
async fn begin_handshake(
    State(app_state): State<AppState>,
    provider: Result<Path<String>, PathRejection>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> AppResult<Redirect> {
    let query = query_params(query)?;
    let email = require(query.email.as_deref(), "email")?;
    let provider = parse_provider(&path_params(provider)?)?;

    let authorization_url = app_state.identity_link.begin(provider, &email).await?;
    Ok(Redirect::to(&authorization_url))
}

/// GET /auth/{provider}/callback?code=&state=
/// Completes the handshake and sends the user back to the app with the external id.
async fn handshake_callback(
    State(app_state): State<AppState>,
    provider: Result<Path<String>, PathRejection>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> AppResult<Redirect> {
    let params = query_params(params)?;
    let provider = parse_provider(&path_params(provider)?)?;

    let redirect = app_state.identity_link.complete(provider, &params).await?;
    Ok(Redirect::to(redirect.as_str()))
}

/// PATCH /auth/connect-wallet?email=  body: { pubKey }
async fn connect_wallet(
    State(app_state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
    body: Result<Json<ConnectWalletPayload>, JsonRejection>,
) -> AppResult<ApiResponse<UserRecord>> {
    let query = query_params(query)?;
    let email = require(query.email.as_deref(), "email")?;
    let payload = json_body(body)?;
    let pub_key = require(payload.pub_key.as_deref(), "pubKey")?;

    let user = app_state
        .access_registry
        .connect_wallet(&email, &pub_key)
        .await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}

/// PATCH /auth/connect-identity?email=&externalId=
async fn connect_identity(
    State(app_state): State<AppState>,
    query: Result<Query<ConnectIdentityQuery>, QueryRejection>,
) -> AppResult<ApiResponse<UserRecord>> {
    let query = query_params(query)?;
    let email = require(query.email.as_deref(), "email")?;
    let external_id = require(query.external_id.as_deref(), "externalId")?;

    let user = app_state
        .access_registry
        .connect_identity(&email, &external_id)
        .await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}
