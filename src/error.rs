// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    services::ServiceError,
    upstream::{Locale, LookupError},
};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("internal server error: {0}")]
    InternalServerError(String),

    // 400 Bad Request
    #[error("bad request: {0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("unauthorized: {0}")]
    AuthError(String),

    // 502 Bad Gateway (notifier or advisor failed)
    #[error("bad gateway: {0}")]
    BadGateway(String),

    // 503 Service Unavailable (optional collaborator not configured)
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A failed lookup, rendered in the caller's language.
    #[error("{error}")]
    Lookup { error: LookupError, locale: Locale },
}

impl AppError {
    pub fn lookup(error: LookupError, locale: Locale) -> Self {
        AppError::Lookup { error, locale }
    }
}

fn lookup_status(error: &LookupError) -> StatusCode {
    match error {
        LookupError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        LookupError::CaptchaInvalid => StatusCode::UNPROCESSABLE_ENTITY,
        LookupError::ResultNotFound => StatusCode::NOT_FOUND,
        LookupError::UpstreamUnavailable(_) | LookupError::UpstreamResponseMalformed(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadGateway(msg) => {
                tracing::warn!("Collaborator failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service failed".to_string(),
                )
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Lookup { error, locale } => {
                let body = Json(json!({
                    "error": error.user_message(locale),
                    "kind": error.kind(),
                    "retryable": error.is_retryable(),
                }));
                return (lookup_status(&error), body).into_response();
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Malformed or incomplete JSON bodies are form errors, not lookup errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
