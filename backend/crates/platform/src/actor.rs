//! Actor context
//!
//! Business routes trust identity headers injected upstream by the auth
//! service (`attach_actor_headers`). [`ActorContext`] reads them; a request
//! without them is unauthenticated.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use kernel::error::app_error::AppError;
use kernel::role::UserRole;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Every header this module owns
pub const ACTOR_HEADERS: [&str; 3] = [USER_ID_HEADER, USER_ROLE_HEADER, USER_EMAIL_HEADER];

/// Authenticated caller as seen by business services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    /// Public id of the user
    pub user_id: String,
    pub role: UserRole,
    pub email: Option<String>,
}

impl ActorContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        let role = header(USER_ROLE_HEADER)
            .and_then(UserRole::from_code)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        Ok(Self {
            user_id: user_id.to_string(),
            role,
            email: header(USER_EMAIL_HEADER).map(str::to_string),
        })
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    /// 403 unless the actor holds one of `roles`
    pub fn require_any_role(&self, roles: &[UserRole]) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, role = %self.role, "Role not permitted");
            Err(AppError::forbidden("Insufficient role for this action"))
        }
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_reads_actor_headers() {
        let actor = ActorContext::from_headers(&headers(&[
            (USER_ID_HEADER, "u_123"),
            (USER_ROLE_HEADER, "lgu_staff"),
            (USER_EMAIL_HEADER, "staff@lgu.test"),
        ]))
        .unwrap();

        assert_eq!(actor.user_id, "u_123");
        assert_eq!(actor.role, UserRole::LguStaff);
        assert_eq!(actor.email.as_deref(), Some("staff@lgu.test"));
        assert!(actor.is("u_123"));
    }

    #[test]
    fn test_missing_or_unknown_role_is_401() {
        let err = ActorContext::from_headers(&headers(&[(USER_ID_HEADER, "u_1")])).unwrap_err();
        assert_eq!(err.status_code(), 401);

        let err = ActorContext::from_headers(&headers(&[
            (USER_ID_HEADER, "u_1"),
            (USER_ROLE_HEADER, "superuser"),
        ]))
        .unwrap_err();
        assert_eq!(err.status_code(), 401);

        let err = ActorContext::from_headers(&headers(&[(USER_ROLE_HEADER, "admin")])).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_require_any_role() {
        let actor = ActorContext {
            user_id: "u_1".into(),
            role: UserRole::Customer,
            email: None,
        };
        assert!(actor.require_any_role(&[UserRole::Customer]).is_ok());
        assert_eq!(
            actor
                .require_any_role(&[UserRole::Admin, UserRole::LguStaff])
                .unwrap_err()
                .status_code(),
            403
        );
    }
}
