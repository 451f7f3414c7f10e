//! Verification Router

use axum::{
    Router,
    routing::{get, post},
};
use platform::audit_events::AuditEmitter;
use std::sync::Arc;

use crate::application::VerificationConfig;
use crate::domain::repository::VerificationStore;
use crate::infra::PgVerificationRepository;
use crate::presentation::handlers::{self, VerificationAppState};

pub fn verification_router(
    repo: PgVerificationRepository,
    config: VerificationConfig,
    audit: AuditEmitter,
) -> Router {
    verification_routes(VerificationAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        audit,
    })
}

pub fn verification_routes<R: VerificationStore>(state: VerificationAppState<R>) -> Router {
    Router::new()
        .route("/", get(handlers::list::<R>).post(handlers::upload::<R>))
        .route("/me", get(handlers::my_verification::<R>))
        .route("/me/revert", post(handlers::revert::<R>))
        .route("/{id}/review", post(handlers::review::<R>))
        .with_state(state)
}
