//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by every service crate:
//! - Cryptographic utilities (SHA-256, HMAC, random tokens)
//! - Password hashing (Argon2id)
//! - Cookie and client-address helpers
//! - Request body validation (`ValidatedJson`)
//! - Service-to-service API key middleware
//! - Lightweight actor context from `x-user-*` headers
//! - Outbound email
//! - Audit event emission
//! - Environment helpers

pub mod actor;
pub mod audit_events;
pub mod client;
pub mod cookie;
pub mod crypto;
pub mod env;
pub mod mailer;
pub mod password;
pub mod service_auth;
pub mod validation;
