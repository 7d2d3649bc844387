use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

/// Body of every "no such short key" response.
pub const NOT_FOUND_MESSAGE: &str = "The short URL you input does not map to anything.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("short key not found")]
    NotFound,
    #[error("stored url cannot be used as a redirect target: {0}")]
    InvalidRedirect(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound | AppError::Shortener(ShortenerError::InvalidShortKey(_)) => {
                (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE).into_response()
            }
            other => {
                error!(error = %other, "request failed");
                let body = ErrorResponse {
                    error: other.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
