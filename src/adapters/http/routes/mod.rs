pub mod auth;
pub mod user;
pub mod waitlist;

use axum::{
    Json, Router,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    routing::get,
};
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, response::ApiResponse},
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(waitlist::router())
        .merge(auth::router())
        .merge(user::router())
        .route("/health", get(health))
}

async fn health() -> ApiResponse<&'static str> {
    ApiResponse::ok("Service is healthy", "ok")
}

/// `?email=` query shared by several endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailQuery {
    pub email: Option<String>,
}

/// Unwrap a JSON body, turning extractor rejections into enveloped 400s.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Unwrap a query string, turning extractor rejections into enveloped 400s.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Unwrap path parameters, turning extractor rejections into enveloped 400s.
pub(crate) fn path_params<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(params)| params)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
