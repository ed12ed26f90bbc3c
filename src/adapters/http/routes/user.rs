use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    routing::get,
};
use uuid::Uuid;

use super::{EmailQuery, path_params, query_params};
use crate::{
    adapters::http::{app_state::AppState, response::ApiResponse},
    app_error::{AppError, AppResult},
    application::validators::require,
    domain::entities::user::UserRecord,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_by_email))
        .route("/user/{id}", get(get_profile))
}

/// GET /user?email=
/// Succeeds only for whitelisted records.
async fn get_by_email(
    State(app_state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> AppResult<ApiResponse<UserRecord>> {
    let query = query_params(query)?;
    let email = require(query.email.as_deref(), "email")?;
    let user = app_state.access_registry.get_by_email(&email).await?;
    Ok(ApiResponse::ok("Email is whitelisted", user))
}

/// GET /user/{id}
/// Returns the linked provider profile, passed through as the provider sent it.
async fn get_profile(
    State(app_state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let id = path_params(id)?;
    let id = Uuid::parse_str(&id).map_err(|_| AppError::InvalidInput("Invalid user id".into()))?;
    let profile = app_state.access_registry.get_profile(id).await?;
    Ok(ApiResponse::ok("User fetched successfully", profile))
}
