use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

pub const SLUG_EXISTS_MESSAGE: &str = "Курс с таким URL-адресом уже существует";
pub const NOT_FOUND_MESSAGE: &str = "Курс не найден";
pub const UNEXPECTED_MESSAGE: &str = "Произошла непредвиденная ошибка";
pub const UNAUTHORIZED_MESSAGE: &str = "Необходима авторизация";
pub const FORBIDDEN_MESSAGE: &str = "Недостаточно прав для выполнения действия";

/// Coarse class of a failure, carried alongside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Unauthorized,
    Forbidden,
    Unexpected,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::Database(_) | AppError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Message shown to the person at the keyboard.
    ///
    /// Backend messages pass through verbatim; an empty one falls back to
    /// the generic text.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::NotFound => NOT_FOUND_MESSAGE.to_string(),
            AppError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::Forbidden => FORBIDDEN_MESSAGE.to_string(),
            AppError::Database(e) => non_empty_or_fallback(
                e.as_database_error()
                    .map(|db_err| db_err.message().to_string())
                    .unwrap_or_else(|| e.to_string()),
            ),
            AppError::Unexpected(msg) => non_empty_or_fallback(msg.clone()),
        }
    }
}

fn non_empty_or_fallback(msg: String) -> String {
    if msg.trim().is_empty() {
        UNEXPECTED_MESSAGE.to_string()
    } else {
        msg
    }
}

/// A body that is not JSON, or not the expected JSON, is a validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Ошибка валидации: body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(e) = &self {
            error!("database error: {}", e);
        }
        ApiResponse::<()>::from(self).into_response()
    }
}
