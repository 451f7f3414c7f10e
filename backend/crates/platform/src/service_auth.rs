//! Service-to-service authentication
//!
//! Internal endpoints (audit ingestion) are called by other services with a
//! shared key in `x-api-key`. A missing key configuration is tolerated in
//! development and fatal in production.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use kernel::error::app_error::AppError;

use crate::crypto::constant_time_eq;
use crate::env::Environment;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCheck {
    /// Key configured and presented correctly
    Valid,
    /// No key configured
    Unconfigured,
    /// Header absent
    Missing,
    /// Header present but wrong
    Mismatch,
}

#[derive(Clone)]
pub struct ServiceAuthConfig {
    api_key: Option<Arc<str>>,
    pub environment: Environment,
}

impl ServiceAuthConfig {
    pub fn new(api_key: Option<String>, environment: Environment) -> Self {
        Self {
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .map(Arc::from),
            environment,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn check(&self, headers: &HeaderMap) -> KeyCheck {
        let Some(expected) = self.api_key.as_deref() else {
            return KeyCheck::Unconfigured;
        };
        match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
            None => KeyCheck::Missing,
            Some(presented) if constant_time_eq(presented.as_bytes(), expected.as_bytes()) => {
                KeyCheck::Valid
            }
            Some(_) => KeyCheck::Mismatch,
        }
    }

    /// True only for a configured key presented correctly
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        self.check(headers) == KeyCheck::Valid
    }
}

impl std::fmt::Debug for ServiceAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .finish()
    }
}

/// Middleware guarding internal routes
///
/// ```rust,ignore
/// router.layer(axum::middleware::from_fn_with_state(config, require_service_auth))
/// ```
pub async fn require_service_auth(
    State(config): State<ServiceAuthConfig>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match config.check(req.headers()) {
        KeyCheck::Valid => Ok(next.run(req).await),
        KeyCheck::Unconfigured if config.environment.is_production() => {
            tracing::error!("Service API key is not configured; refusing internal request");
            Err(AppError::service_unavailable("Service authentication is not configured"))
        }
        KeyCheck::Unconfigured => {
            tracing::warn!("Service API key is not configured; allowing request in development");
            Ok(next.run(req).await)
        }
        KeyCheck::Missing => {
            tracing::warn!("Internal request without service API key");
            Err(AppError::unauthorized("Missing service API key"))
        }
        KeyCheck::Mismatch => {
            tracing::warn!("Internal request with invalid service API key");
            Err(AppError::unauthorized("Invalid service API key"))
        }
    }
}
