//! Auth Error Types
//!
//! Auth-specific variants that render through `kernel::error::AppError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email address is already registered")]
    EmailTaken,

    #[error("Requested role is not available for self sign up")]
    RoleNotAllowed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Administrator session required")]
    AdminRequired,

    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// Staff account without a TOTP secret; an MFA bootstrap token is needed
    #[error("Two-factor authentication is not set up for this account")]
    TwoFactorNotSetup,

    #[error("Two-factor authentication is already enabled")]
    TwoFactorAlreadyEnabled,

    #[error("Two-factor authentication is mandatory for staff accounts")]
    TwoFactorMandatory,

    #[error("Please wait before requesting another code")]
    Cooldown,

    #[error("Too many incorrect attempts")]
    TooManyAttempts,

    /// Token or code absent, used or expired
    #[error("This link or code is no longer valid")]
    TokenGone,

    #[error("Incorrect verification code")]
    InvalidCode,

    #[error("Invalid delete token")]
    InvalidDeleteToken,

    #[error("Deletion has not been verified yet")]
    DeletionNotVerified,

    #[error("Account is not scheduled for deletion")]
    NotPendingDeletion,

    /// Validation and other errors already shaped as `AppError`
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken
            | AuthError::TwoFactorAlreadyEnabled
            | AuthError::DeletionNotVerified
            | AuthError::NotPendingDeletion => ErrorKind::Conflict,
            AuthError::RoleNotAllowed
            | AuthError::AccountDisabled
            | AuthError::AdminRequired
            | AuthError::TwoFactorMandatory => ErrorKind::Forbidden,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::InvalidTwoFactorCode => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::TwoFactorNotSetup => ErrorKind::PreconditionFailed,
            AuthError::Cooldown | AuthError::TooManyAttempts => ErrorKind::TooManyRequests,
            AuthError::TokenGone => ErrorKind::Gone,
            AuthError::InvalidCode | AuthError::InvalidDeleteToken => ErrorKind::BadRequest,
            AuthError::App(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn action(&self) -> Option<&'static str> {
        match self {
            AuthError::AccountLocked => Some("Try again in 15 minutes"),
            AuthError::TwoFactorNotSetup => Some("Request an MFA bootstrap token"),
            AuthError::TokenGone => Some("Request a new one"),
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::App(e) if e.is_server_error() => {
                tracing::error!(error = ?e, "Auth internal error");
            }
            AuthError::InvalidCredentials | AuthError::InvalidTwoFactorCode => {
                tracing::warn!(error = %self, "Failed authentication attempt");
            }
            AuthError::AccountLocked | AuthError::TooManyAttempts | AuthError::AdminRequired => {
                tracing::warn!(error = %self, "Auth request refused");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            AuthError::App(e) => e.into_response(),
            other => {
                let mut app = AppError::new(other.kind(), other.to_string());
                if let Some(action) = other.action() {
                    app = app.with_action(action);
                }
                app.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::AccountLocked.status_code(), StatusCode::LOCKED);
        assert_eq!(
            AuthError::TwoFactorNotSetup.status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(AuthError::TokenGone.status_code(), StatusCode::GONE);
        assert_eq!(
            AuthError::Cooldown.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(AuthError::RoleNotAllowed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_app_error_keeps_its_kind() {
        let err: AuthError = AppError::bad_request("Invalid email address").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
