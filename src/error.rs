//! Error types for the OCR engine server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::EngineError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that cross the HTTP trust boundary.
///
/// Only two categories exist on the wire: the client forgot the file part,
/// or something inside staging/inference went wrong. Everything else about
/// a failure stays in the server log.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File is required")]
    MissingFile,

    #[error("{0}")]
    Processing(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Processing(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Processing(err.to_string())
    }
}

/// Error response body. `detail` is the wire contract existing callers
/// already parse.
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "File is required"),
            AppError::Processing(msg) => {
                tracing::error!("Error during OCR: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process image in OCR engine",
                )
            }
        };

        let body = Json(ErrorResponse {
            detail: detail.to_string(),
        });

        (status, body).into_response()
    }
}
