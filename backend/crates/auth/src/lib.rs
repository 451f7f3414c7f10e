//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Sign up / sign in with email + password, self-service roles only
//! - TOTP-based 2FA, mandatory for `lgu_staff` and `admin`
//! - MFA bootstrap tokens for staff without an authenticator
//! - Server-side sessions with signed cookie tokens
//! - Account deletion with an emailed code and a 30 day grace period
//! - Password reset, email change and email verification links
//! - `x-user-*` header injection for the business services
//!
//! ## Security Model
//! - Passwords hashed with Argon2id plus an optional pepper
//! - Sessions bound to a user agent fingerprint
//! - Lockout for 15 minutes after 5 failed attempts
//! - Every emailed secret is stored as a SHA-256 hash and consumed atomically

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::cleanup::{CleanupReport, cleanup_now};
pub use application::config::AuthConfig;
pub use domain::repository::AuthStore;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AuthMiddlewareState, attach_actor_headers};
pub use presentation::router::{actor_middleware_state, auth_router_generic, auth_routes};
pub use presentation::handlers::AuthAppState;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
