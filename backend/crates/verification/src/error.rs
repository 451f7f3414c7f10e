//! Verification Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type VerificationResult<T> = Result<T, VerificationError>;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Verification not found")]
    NotFound,

    /// A pending or verified record already exists for the user
    #[error("An identity document is already under review or verified")]
    AlreadySubmitted,

    #[error("The upload can no longer be reverted")]
    NotRevertible,

    #[error("Only pending verifications can be reviewed")]
    NotPending,

    #[error("A reason is required when rejecting")]
    ReasonRequired,

    #[error("Reviewers cannot review their own upload")]
    SelfReview,

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerificationError::NotFound => ErrorKind::NotFound,
            VerificationError::AlreadySubmitted
            | VerificationError::NotRevertible
            | VerificationError::NotPending => ErrorKind::Conflict,
            VerificationError::ReasonRequired => ErrorKind::BadRequest,
            VerificationError::SelfReview => ErrorKind::Forbidden,
            VerificationError::App(e) => e.kind(),
            VerificationError::Database(_) | VerificationError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            VerificationError::Database(e) => {
                tracing::error!(error = %e, "Verification database error");
            }
            VerificationError::Internal(msg) => {
                tracing::error!(message = %msg, "Verification internal error");
            }
            VerificationError::App(e) if e.is_server_error() => {
                tracing::error!(error = ?e, "Verification internal error");
            }
            VerificationError::SelfReview => {
                tracing::warn!(error = %self, "Verification request refused");
            }
            _ => {
                tracing::debug!(error = %self, "Verification error");
            }
        }
    }
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            VerificationError::App(e) => e.into_response(),
            other => AppError::new(other.kind(), other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(VerificationError::AlreadySubmitted.status_code(), StatusCode::CONFLICT);
        assert_eq!(VerificationError::NotRevertible.status_code(), StatusCode::CONFLICT);
        assert_eq!(VerificationError::ReasonRequired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(VerificationError::SelfReview.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            VerificationError::from(AppError::unauthorized("x")).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
