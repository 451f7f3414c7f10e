//! Audit Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit log not found")]
    LogNotFound,

    /// The ledger node refused or could not be reached
    #[error("Anchoring failed: {0}")]
    Anchor(String),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuditError::LogNotFound => ErrorKind::NotFound,
            AuditError::Anchor(_) => ErrorKind::ServiceUnavailable,
            AuditError::App(e) => e.kind(),
            AuditError::Database(_) | AuditError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            AuditError::Database(e) => tracing::error!(error = %e, "Audit database error"),
            AuditError::Internal(msg) => tracing::error!(message = %msg, "Audit internal error"),
            AuditError::Anchor(msg) => tracing::warn!(message = %msg, "Anchor call failed"),
            AuditError::App(e) if e.is_server_error() => {
                tracing::error!(error = ?e, "Audit internal error")
            }
            _ => tracing::debug!(error = %self, "Audit error"),
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            AuditError::App(e) => e.into_response(),
            other => AppError::new(other.kind(), other.to_string()).into_response(),
        }
    }
}
