//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use platform::audit_events::AuditEmitter;
use platform::mailer::Mailer;
use platform::service_auth::ServiceAuthConfig;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::AuthMiddlewareState;

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R: AuthStore>(
    repo: R,
    config: AuthConfig,
    mailer: Mailer,
    audit: AuditEmitter,
) -> Router {
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        mailer,
        audit,
    };

    routes::<R>().with_state(state)
}

/// Routes over an existing state, for sharing one state with the actor middleware
pub fn auth_routes<R: AuthStore>(state: AuthAppState<R>) -> Router {
    routes::<R>().with_state(state)
}

fn routes<R: AuthStore>() -> Router<AuthAppState<R>> {
    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/signout/all", post(handlers::sign_out_all::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .route("/totp/setup", post(handlers::totp_setup::<R>))
        .route("/totp/verify", post(handlers::totp_verify::<R>))
        .route("/totp/disable", post(handlers::totp_disable::<R>))
        .route("/mfa/bootstrap", post(handlers::mfa_bootstrap_request::<R>))
        .route("/mfa/bootstrap/issue", post(handlers::mfa_bootstrap_issue::<R>))
        .route("/mfa/bootstrap/redeem", post(handlers::mfa_bootstrap_redeem::<R>))
        .route("/delete-account/request", post(handlers::delete_account_request::<R>))
        .route("/delete-account/verify", post(handlers::delete_account_verify::<R>))
        .route("/delete-account/confirm", post(handlers::delete_account_confirm::<R>))
        .route("/delete-account/cancel", post(handlers::delete_account_cancel::<R>))
        .route("/password/forgot", post(handlers::forgot_password::<R>))
        .route("/password/reset", post(handlers::reset_password::<R>))
        .route("/email/change", post(handlers::email_change::<R>))
        .route("/email/confirm", post(handlers::email_confirm::<R>))
        .route("/email/verify", post(handlers::email_verify::<R>))
}

/// State for `attach_actor_headers` sharing the auth handlers' repository
pub fn actor_middleware_state<R: AuthStore>(
    state: &AuthAppState<R>,
    service_auth: ServiceAuthConfig,
) -> AuthMiddlewareState<R> {
    AuthMiddlewareState {
        auth: state.clone(),
        service_auth,
    }
}
