//! Shared Kernel - vocabulary shared by every service
//!
//! Only things whose meaning is identical across the auth, audit,
//! verification and provider services live here:
//! - Unified error type and error classification
//! - Typed identifiers
//! - Platform-wide user roles

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod role;
