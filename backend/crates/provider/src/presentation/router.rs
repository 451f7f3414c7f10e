//! Provider Router
//!
//! Paths are absolute below `/api`.

use axum::{
    Router,
    routing::{get, post},
};
use platform::audit_events::AuditEmitter;
use std::sync::Arc;

use crate::application::ProviderConfig;
use crate::domain::repository::ProviderStore;
use crate::infra::PgProviderRepository;
use crate::presentation::handlers::{self, ProviderAppState};

pub fn provider_router(
    repo: PgProviderRepository,
    config: ProviderConfig,
    audit: AuditEmitter,
) -> Router {
    provider_routes(ProviderAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        audit,
    })
}

pub fn provider_routes<R: ProviderStore>(state: ProviderAppState<R>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories::<R>).post(handlers::create_category::<R>),
        )
        .route(
            "/service-areas",
            get(handlers::list_service_areas::<R>).post(handlers::create_service_area::<R>),
        )
        .route(
            "/providers",
            get(handlers::list_providers::<R>).post(handlers::register_provider::<R>),
        )
        .route(
            "/providers/me",
            get(handlers::my_provider::<R>).put(handlers::update_my_provider::<R>),
        )
        .route("/providers/{id}", get(handlers::get_provider::<R>))
        .route("/providers/{id}/status", post(handlers::set_provider_status::<R>))
        .route("/appointments", post(handlers::book_appointment::<R>))
        .route("/appointments/mine", get(handlers::my_appointments::<R>))
        .route("/appointments/{id}/{action}", post(handlers::appointment_action::<R>))
        .with_state(state)
}
