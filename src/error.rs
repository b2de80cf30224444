use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::ErrorBody;

/// Application-wide error types with appropriate HTTP status codes.
///
/// Gate rejections are not represented here; they are produced as
/// [`Rejection`](crate::gate::Rejection) values by the pre-routing checks.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Build the JSON error response shared by application errors and gate rejections.
pub(crate) fn error_response(
    status: StatusCode,
    message: String,
    attributes: Option<serde_json::Value>,
) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message,
        attributes,
    };

    (status, axum::Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                tracing::debug!(status = status.as_u16(), message = %msg, "Request failed");
                msg
            }
            // Never expose configuration details to clients
            AppError::ConfigError(msg) => {
                tracing::error!(error = %msg, "Configuration error while serving request");
                "Service configuration error. Please contact support.".to_string()
            }
        };

        error_response(status, message, None)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(sanitize_json_rejection(&rejection))
    }
}

/// Reduce a JSON extractor rejection to a message that does not leak
/// internal type information.
fn sanitize_json_rejection(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".to_string(),
        JsonRejection::JsonDataError(_) => "Invalid data type in request body".to_string(),
        JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
        _ => "Invalid request format".to_string(),
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
