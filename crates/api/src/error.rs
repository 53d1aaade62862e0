use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use collab_core::error::CoreError;
use collab_db::{RegistryError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce the `{ success: false, message, code }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `collab_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage backend error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Core(core) => AppError::Core(core),
            RegistryError::Store(store) => AppError::Store(store),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status, stable error code, and client-safe message.
    ///
    /// Internal details are logged here and replaced by a generic message.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::UnsupportedFileType(msg) => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_FILE_TYPE", msg.clone())
                }
                CoreError::Compilation(msg) => {
                    (StatusCode::BAD_REQUEST, "COMPILATION_ERROR", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }

    /// Render as a `text/plain` response, for endpoints that serve raw bodies.
    pub fn into_text_response(self) -> Response {
        let (status, _, message) = self.classify();
        (status, message).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();

        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
