/// Error handling for the web server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `Result<T, ApiError>` for failures that are not rendered
/// back into the page. Form validation and bad credentials never reach this
/// type; they are shown in-page with a 200.
///
/// # Example
///
/// ```
/// use agriscan_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(message: String) -> ApiResult<Json<serde_json::Value>> {
///     if message.trim().is_empty() {
///         return Err(ApiError::BadRequest("Empty prompt".to_string()));
///     }
///     Ok(Json(json!({ "response": message })))
/// }
/// ```

use agriscan_shared::auth::credentials::CredentialError;
use agriscan_shared::auth::session::SessionError;
use agriscan_shared::classifier::ClassifierError;
use agriscan_shared::clients::ExternalServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Image could not be classified (500)
    Classification(ClassifierError),

    /// Upstream service failed (502)
    BadGateway(String),

    /// Service not configured (503)
    ServiceUnavailable(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "decode_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Classification(err) => write!(f, "Classification failed: {}", err),
            ApiError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Classification(err) => {
                tracing::warn!(error = %err, "Classification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.code(),
                    err.to_string(),
                )
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "bad_gateway",
                    "The assistant is unavailable right now".to_string(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        ApiError::Classification(err)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        if err.is_expected() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::InternalError(format!("Credential store failure: {}", err))
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::InternalError(format!("Session operation failed: {}", err))
    }
}

impl From<ExternalServiceError> for ApiError {
    fn from(err: ExternalServiceError) -> Self {
        match err {
            ExternalServiceError::NotConfigured(service) => {
                ApiError::ServiceUnavailable(format!("{} is not configured", service))
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("Blocking task failed: {}", err))
    }
}
