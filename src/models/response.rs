use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Uniform result shape returned by every course service operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub success: bool,
    #[serde(skip)]
    pub kind: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            kind: None,
        }
    }

    /// Success without a payload (delete).
    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
            success: true,
            kind: None,
        }
    }

    pub fn fail(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            success: false,
            kind: Some(kind),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self::fail(err.kind(), err.user_message())
    }
}

impl<T> From<Result<T, AppError>> for ApiResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => e.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.kind.map(|k| k.status()).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
