//! Audit Router

use axum::{Router, middleware::from_fn_with_state, routing::get};
use platform::service_auth::{ServiceAuthConfig, require_service_auth};

use crate::domain::anchor::AnchorClient;
use crate::domain::repository::AuditStore;
use crate::presentation::handlers::{self, AuditAppState};

pub fn audit_routes<R: AuditStore, A: AnchorClient>(
    state: AuditAppState<R, A>,
    service_auth: ServiceAuthConfig,
) -> Router {
    Router::new()
        .route(
            "/logs",
            get(handlers::list_logs::<R, A>).post(handlers::record_log::<R, A>),
        )
        .route("/logs/{id}", get(handlers::get_log::<R, A>))
        .route("/logs/{id}/verify", get(handlers::verify_log::<R, A>))
        .route_layer(from_fn_with_state(service_auth, require_service_auth))
        .with_state(state)
}
