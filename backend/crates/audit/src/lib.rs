//! Audit Backend Module
//!
//! Tamper-evident log of security-relevant events from the other services.
//!
//! - Each log carries a SHA-256 over its canonical JSON content
//! - With a ledger configured, the hash is written to the audit contract as
//!   `anchor(bytes32,string)`; failures are retried by the sweeper up to
//!   five attempts
//! - `GET /logs/{id}/verify` recomputes the hash from the stored content
//! - Events emitted in-process through `platform::audit_events` are drained
//!   by [`spawn_forwarder`]

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

mod tests;

pub use application::{
    AnchorConfig, AnchorUseCase, AuditConfig, BacklogReport, spawn_forwarder,
};
pub use domain::{AuditRepository, AuditStore};
pub use error::{AuditError, AuditResult};
pub use infra::{EthJsonRpcAnchor, PgAuditRepository};
pub use presentation::{AuditAppState, audit_routes};
