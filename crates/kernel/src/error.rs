//! Application error types.
//!
//! Returning an [`AppError`] from any layer ends request processing: the
//! top-level HTTP handler turns it into the response and nothing else runs.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Body of the 404 page.
pub const NOT_FOUND_BODY: &str = "<html>\r\n<head>\r\n<title>Page Not Found</title>\r\n</head>\r\n<body>\r\n<h1>404</h1>\r\n</body>\r\n</html>";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error(
        "{handler}::{method} takes {required}..={total} parameters, {supplied} supplied"
    )]
    ArityMismatch {
        handler: String,
        method: String,
        required: usize,
        total: usize,
        supplied: usize,
    },

    #[error("invalid redirect target: {0}")]
    InvalidRedirect(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("template error")]
    Template(#[from] tera::Error),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error ends the request with the 404 page.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound | AppError::ArityMismatch { .. } | AppError::InvalidRedirect(_)
        )
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound => return not_found(),
            AppError::ArityMismatch { .. } | AppError::InvalidRedirect(_) => {
                tracing::debug!(error = %self, "request ended with 404");
                return not_found();
            }
            AppError::Session(e) => tracing::error!(error = %e, "session error"),
            AppError::Template(e) => tracing::error!(error = ?e, "template error"),
            AppError::Database(e) => tracing::error!(error = %e, "database error"),
            AppError::Internal(e) => tracing::error!(error = %e, "internal server error"),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

/// The generic 404 page.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response()
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
