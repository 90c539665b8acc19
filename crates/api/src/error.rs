use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flowboard_core::error::CoreError;
use flowboard_core::schema::{FieldError, SchemaError};
use flowboard_n8n::{ExecuteError, N8nError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `flowboard_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A field-definition error caught while compiling a form.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A failure talking to the connected workflow instance.
    #[error(transparent)]
    Instance(#[from] N8nError),

    /// Submitted form values failed validation. Carries the full
    /// per-field error list.
    #[error("Input validation failed")]
    InvalidInput(Vec<FieldError>),

    /// A resource identified by something other than a numeric ID was
    /// not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ExecuteError> for AppError {
    fn from(err: ExecuteError) -> Self {
        match err {
            ExecuteError::Client(e) => AppError::Instance(e),
            ExecuteError::Database(e) => AppError::Database(e),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation failures carry structured per-field errors, not just
        // a message.
        if let AppError::InvalidInput(errors) = &self {
            let body = json!({
                "error": "Input validation failed",
                "code": "INVALID_INPUT",
                "fields": errors,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
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
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Form compilation errors ---
            AppError::Schema(err) => {
                (StatusCode::BAD_REQUEST, "SCHEMA_ERROR", err.to_string())
            }

            // --- Upstream instance errors ---
            AppError::Instance(err) => classify_instance_error(err),

            AppError::InvalidInput(_) => unreachable!("handled above"),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
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

/// Classify an instance client error into an HTTP status, code, and message.
///
/// Configuration mistakes (URL, API key) are the caller's fault; everything
/// the instance itself got wrong surfaces as an upstream failure.
fn classify_instance_error(err: &N8nError) -> (StatusCode, &'static str, String) {
    match err {
        N8nError::InvalidUrl(_) | N8nError::InvalidApiKey(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        N8nError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        N8nError::Unauthorized(_) => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_UNAUTHORIZED",
            err.to_string(),
        ),
        N8nError::Connection(_) | N8nError::Api { .. } => {
            tracing::error!(error = %err, "Instance request failed");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
    }
}
