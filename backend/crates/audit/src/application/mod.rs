//! Application Layer

pub mod anchoring;
pub mod config;
pub mod forwarder;
pub mod query;
pub mod record;

pub use anchoring::{AnchorUseCase, BacklogReport};
pub use config::{AnchorConfig, AuditConfig};
pub use forwarder::{run_forwarder, spawn_forwarder};
pub use query::{AuditQueryUseCase, IntegrityReport};
pub use record::RecordLogUseCase;
