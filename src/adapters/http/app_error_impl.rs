use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{adapters::http::response::Envelope, app_error::AppError};

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound | AppError::NotWhitelisted | AppError::IdentityNotLinked => {
                StatusCode::NOT_FOUND
            }
            AppError::Database(_)
            | AppError::Provider(_)
            | AppError::BatchIncomplete { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let code = self.code().as_str();
        let message = self.public_message();
        let data = match self {
            AppError::BatchIncomplete { applied, failed } => Some(serde_json::json!({
                "applied": applied,
                "failed": failed,
            })),
            _ => None,
        };

        let body = Envelope {
            status: status.as_u16(),
            success: false,
            message,
            code: Some(code),
            data,
        };
        (status, Json(body)).into_response()
    }
}
