//! Provider Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::appointment_status::AppointmentStatus;
use crate::domain::value_object::provider_status::ProviderStatus;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    /// One profile per owner
    #[error("A provider profile already exists for this account")]
    ProfileExists,

    #[error("{0} already exists")]
    DuplicateName(&'static str),

    /// Body refers to a category or service area that does not exist
    #[error("Unknown {0}")]
    UnknownReference(&'static str),

    #[error("Provider status cannot change from {from} to {to}")]
    InvalidProviderTransition {
        from: ProviderStatus,
        to: ProviderStatus,
    },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Provider is not accepting appointments")]
    ProviderNotActive,

    #[error("Appointment time must be in the future")]
    ScheduleInPast,

    #[error("Duration must be between {min} and {max} minutes")]
    DurationOutOfRange { min: i32, max: i32 },

    /// Overlaps a confirmed appointment of the same provider
    #[error("The provider already has a confirmed appointment at that time")]
    SlotTaken,

    #[error("Only a party to the appointment may do this")]
    NotParty,

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::ProviderNotFound | ProviderError::AppointmentNotFound => {
                ErrorKind::NotFound
            }
            ProviderError::ProfileExists
            | ProviderError::DuplicateName(_)
            | ProviderError::InvalidProviderTransition { .. }
            | ProviderError::InvalidTransition { .. }
            | ProviderError::ProviderNotActive
            | ProviderError::SlotTaken => ErrorKind::Conflict,
            ProviderError::UnknownReference(_) => ErrorKind::UnprocessableEntity,
            ProviderError::ScheduleInPast | ProviderError::DurationOutOfRange { .. } => {
                ErrorKind::BadRequest
            }
            ProviderError::NotParty => ErrorKind::Forbidden,
            ProviderError::App(e) => e.kind(),
            ProviderError::Database(_) | ProviderError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            ProviderError::Database(e) => {
                tracing::error!(error = %e, "Provider database error");
            }
            ProviderError::Internal(msg) => {
                tracing::error!(message = %msg, "Provider internal error");
            }
            ProviderError::App(e) if e.is_server_error() => {
                tracing::error!(error = ?e, "Provider internal error");
            }
            ProviderError::NotParty => {
                tracing::warn!(error = %self, "Appointment access refused");
            }
            _ => {
                tracing::debug!(error = %self, "Provider error");
            }
        }
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        self.log();
        match self {
            ProviderError::App(e) => e.into_response(),
            other => AppError::new(other.kind(), other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProviderError::ProfileExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(ProviderError::SlotTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ProviderError::InvalidTransition {
                from: AppointmentStatus::Completed,
                to: AppointmentStatus::Cancelled,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ProviderError::UnknownReference("categoryId").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ProviderError::NotParty.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_transition_message() {
        let err = ProviderError::InvalidTransition {
            from: AppointmentStatus::Declined,
            to: AppointmentStatus::Confirmed,
        };
        assert_eq!(err.to_string(), "Appointment cannot move from declined to confirmed");
    }
}
