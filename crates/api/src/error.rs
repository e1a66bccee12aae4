//! Maps service errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use raster::RasterError;
use service::ServiceError;
use storage::StorageError;

/// Handler error.  Rendered as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    /// Malformed or incomplete request.
    BadRequest(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        let e = match self {
            AppError::BadRequest(msg) => {
                return (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone());
            }
            AppError::Service(e) => e,
        };

        match e {
            ServiceError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            ServiceError::Storage(StorageError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "FILE_NOT_FOUND", e.to_string())
            }
            ServiceError::Storage(StorageError::InvalidName(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_NAME", e.to_string())
            }
            ServiceError::Database(db::DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            ServiceError::Raster(RasterError::Decode(_) | RasterError::Unsupported(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "RASTER_UNREADABLE", e.to_string())
            }
            ServiceError::Dataset(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DATASET_UNREADABLE", e.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(code, %message, "request failed");
        }
        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}
