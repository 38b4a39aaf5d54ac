use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Error body: a human-readable message plus an opaque detail string.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { .. } => (
                    StatusCode::BAD_REQUEST,
                    "validation error".to_string(),
                    Some(err.to_string()),
                ),
                DomainError::NotFound(what) => (
                    StatusCode::NOT_FOUND,
                    "not found or unauthorized".to_string(),
                    Some(what.clone()),
                ),
                DomainError::Unexpected(detail) => {
                    error!(detail = %detail, "unexpected domain error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                        Some(detail.clone()),
                    )
                }
            },
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "validation error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string(), None),
        };

        (status, Json(ErrorBody { message, error: detail })).into_response()
    }
}
