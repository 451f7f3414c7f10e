//! Auth Middleware
//!
//! `attach_actor_headers` turns the session cookie into the `x-user-*`
//! headers the business services read through `ActorContext`.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use platform::actor::{ACTOR_HEADERS, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use platform::client::ClientInfo;
use platform::service_auth::ServiceAuthConfig;

use crate::domain::entity::user::User;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::AuthAppState;

/// State for [`attach_actor_headers`]
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: AuthStore,
{
    pub auth: AuthAppState<R>,
    /// Callers holding the service key may forward their own actor headers
    pub service_auth: ServiceAuthConfig,
}

/// Replace caller supplied actor headers with the session's identity.
///
/// Requests without a session pass through without actor headers; the
/// downstream `ActorContext` extractor answers 401.
pub async fn attach_actor_headers<R: AuthStore>(
    State(state): State<AuthMiddlewareState<R>>,
    client: ClientInfo,
    mut req: Request,
    next: Next,
) -> Response {
    let trusted = state.service_auth.matches(req.headers());
    if !trusted {
        let headers = req.headers_mut();
        for name in ACTOR_HEADERS {
            if headers.remove(name).is_some() {
                tracing::warn!(header = name, "Stripped client supplied actor header");
            }
        }
    }

    let token = state.auth.config.session_cookie.read(req.headers());
    if let Some(token) = token {
        let result = crate::application::CheckSessionUseCase::new(
            state.auth.repo.clone(),
            state.auth.repo.clone(),
            state.auth.config.clone(),
        )
        .authenticate(&token, &client.fingerprint())
        .await;

        match result {
            Ok((_, user)) => insert_actor_headers(&mut req, &user),
            Err(e) => tracing::debug!(error = %e, "Session cookie did not resolve to a user"),
        }
    }

    next.run(req).await
}

fn insert_actor_headers(req: &mut Request, user: &User) {
    let pairs = [
        (USER_ID_HEADER, user.public_id.as_str()),
        (USER_ROLE_HEADER, user.role.code()),
        (USER_EMAIL_HEADER, user.email.as_str()),
    ];
    let headers = req.headers_mut();
    for (name, value) in pairs {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(name), value);
            }
            Err(_) => tracing::warn!(header = name, "Actor value is not a valid header"),
        }
    }
}
