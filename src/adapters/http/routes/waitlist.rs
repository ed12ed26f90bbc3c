use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, patch},
};
use serde::Deserialize;

use super::json_body;
use crate::{
    adapters::http::{app_state::AppState, response::ApiResponse},
    app_error::{AppError, AppResult},
    application::validators::require,
    domain::entities::user::UserRecord,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/waitlist", get(list_waitlist).post(join_waitlist))
        .route("/whitelist", patch(whitelist))
}

#[derive(Deserialize)]
struct JoinPayload {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct WhitelistPayload {
    #[serde(default)]
    emails: Option<Vec<String>>,
}

async fn join_waitlist(
    State(app_state): State<AppState>,
    body: Result<Json<JoinPayload>, JsonRejection>,
) -> AppResult<ApiResponse<UserRecord>> {
    let payload = json_body(body)?;
    let email = require(payload.email.as_deref(), "email")?;

    let user = app_state.access_registry.join_waitlist(&email).await?;
    Ok(ApiResponse::created("User added to waitlist", user))
}

async fn list_waitlist(State(app_state): State<AppState>) -> AppResult<ApiResponse<Vec<UserRecord>>> {
    let users = app_state.access_registry.list_waitlist().await?;
    Ok(ApiResponse::ok("Users in waitlist fetched", users))
}

async fn whitelist(
    State(app_state): State<AppState>,
    body: Result<Json<WhitelistPayload>, JsonRejection>,
) -> AppResult<ApiResponse<Vec<UserRecord>>> {
    let payload = json_body(body)?;
    let emails = payload
        .emails
        .ok_or_else(|| AppError::InvalidInput("emails is required".into()))?;

    let users = app_state.access_registry.whitelist(&emails).await?;
    Ok(ApiResponse::ok("User whitelisted successfully", users))
}
