use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eventboard_core::error::CoreError;
use eventboard_core::session::IdentityError;
use eventboard_core::submission::SubmissionError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `eventboard_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An event submission that did not go through.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The hosted identity service refused or failed a request.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A lookup by a non-id key found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A backing source failed; the message is shown to the caller as is.
    #[error("{0}")]
    Unavailable(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Field-level validation carries an extra `fields` list.
        if let AppError::Submission(SubmissionError::Validation { fields }) = &self {
            let body = json!({
                "error": self.to_string(),
                "code": "VALIDATION_ERROR",
                "fields": fields,
            });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Submission errors ---
            AppError::Submission(err) => match err {
                SubmissionError::AuthRequired => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
                }
                SubmissionError::Validation { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                SubmissionError::Persistence(msg) => {
                    (StatusCode::BAD_GATEWAY, "PERSISTENCE_ERROR", msg.clone())
                }
            },

            // --- Identity service errors ---
            AppError::Identity(err) => classify_identity_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unavailable(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UNAVAILABLE", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an identity service failure onto an HTTP status.
///
/// Client errors the service reports (bad credentials, duplicate email) keep
/// their status and message. Anything else is a gateway failure.
fn classify_identity_error(err: &IdentityError) -> (StatusCode, &'static str, String) {
    match err {
        IdentityError::Rejected { status, message } => {
            match StatusCode::from_u16(*status) {
                Ok(code) if code.is_client_error() => (code, "IDENTITY_REJECTED", message.clone()),
                _ => {
                    tracing::error!(status, error = %message, "Identity service error");
                    (StatusCode::BAD_GATEWAY, "IDENTITY_UNAVAILABLE", message.clone())
                }
            }
        }
        IdentityError::NoSession => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string()),
        IdentityError::Transport(_) | IdentityError::Decode(_) => {
            tracing::error!(error = %err, "Identity service unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "IDENTITY_UNAVAILABLE",
                "Authentication service is unavailable".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// `RowNotFound` maps to 404. Everything else maps to 500 with a sanitized
/// message; the driver's text only reaches the log.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
