//! Request body validation
//!
//! [`ValidatedJson`] deserialises a JSON body and runs its `validator` rules.
//! Malformed bodies and rule failures are 400 with the failing fields listed.
//! A failure on the `role` field is a privilege request rather than a typo
//! and is answered with 403.

use axum::Json;
use axum::extract::{FromRequest, Request};
use kernel::error::app_error::{AppError, FieldViolation};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Field whose violations escalate to 403
pub const ROLE_FIELD: &str = "role";

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Rejected request body");
            AppError::bad_request("Request body is not valid JSON for this endpoint")
                .with_fields(vec![FieldViolation::new("body", rejection.body_text())])
        })?;

        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Map `validator` output onto an [`AppError`]
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                FieldViolation::new(field.clone(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));

    if fields.iter().any(|f| f.field == ROLE_FIELD) {
        tracing::warn!("Rejected request asking for a restricted role");
        return AppError::forbidden("Requested role is not allowed").with_fields(fields);
    }

    AppError::bad_request("Validation failed")
        .with_action("Fix the listed fields and retry")
        .with_fields(fields)
}
