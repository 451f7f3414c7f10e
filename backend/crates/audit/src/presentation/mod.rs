//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AuditAppState;
pub use router::{audit_routes};
