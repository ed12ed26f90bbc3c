use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::user::UserRecord;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("User not authenticated")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Email not whitelisted")]
    NotWhitelisted,

    #[error("Identity not linked")]
    IdentityNotLinked,

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Whitelist incomplete: {} of {} emails failed", .failed.len(), .failed.len() + .applied.len())]
    BatchIncomplete {
        applied: Vec<UserRecord>,
        failed: Vec<BatchFailure>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One email of a whitelist batch that could not be applied.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub email: String,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    InvalidInput,
    NotFound,
    NotWhitelisted,
    IdentityNotLinked,
    ProviderError,
    BatchIncomplete,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotWhitelisted => "NOT_WHITELISTED",
            ErrorCode::IdentityNotLinked => "IDENTITY_NOT_LINKED",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::BatchIncomplete => "BATCH_INCOMPLETE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::NotWhitelisted => ErrorCode::NotWhitelisted,
            AppError::IdentityNotLinked => ErrorCode::IdentityNotLinked,
            AppError::Provider(_) => ErrorCode::ProviderError,
            AppError::BatchIncomplete { .. } => ErrorCode::BatchIncomplete,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message shown to API callers.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidCredentials => "User not authenticated".into(),
            AppError::NotFound => "User not found".into(),
            AppError::NotWhitelisted => "Email not whitelisted".into(),
            AppError::IdentityNotLinked => "Please connect twitter account".into(),
            AppError::Database(detail) | AppError::Provider(detail) | AppError::Internal(detail) => {
                format!("Unexpected error: {detail}")
            }
            AppError::BatchIncomplete { applied, failed } => format!(
                "Unexpected error: {} of {} emails could not be whitelisted",
                failed.len(),
                failed.len() + applied.len()
            ),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
