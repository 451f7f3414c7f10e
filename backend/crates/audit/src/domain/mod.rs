//! Domain Layer

pub mod anchor;
pub mod entity;
pub mod repository;
pub mod value_object;

pub use anchor::{Anchor, AnchorClient};
pub use entity::audit_log::{AuditLog, AuditRecord};
pub use repository::{AuditRepository, AuditStore};
