//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::AuditLogId;

use crate::domain::entity::audit_log::{AnchorState, AuditLog};
use crate::error::AuditResult;

/// Filter for listing logs, newest first
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub actor_id: Option<String>,
    pub event_type: Option<String>,
    pub limit: i64,
}

#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    async fn insert_log(&self, log: &AuditLog) -> AuditResult<()>;

    async fn find_log(&self, id: &AuditLogId) -> AuditResult<Option<AuditLog>>;

    async fn list_logs(&self, filter: &LogFilter) -> AuditResult<Vec<AuditLog>>;

    async fn update_anchor(&self, id: &AuditLogId, anchor: &AnchorState) -> AuditResult<()>;

    /// Pending logs created before `stale_before` and failed logs below
    /// `max_attempts`, oldest first
    async fn anchor_backlog(
        &self,
        stale_before: DateTime<Utc>,
        max_attempts: i16,
        limit: i64,
    ) -> AuditResult<Vec<AuditLog>>;
}

/// Store shared by the audit handlers and background tasks
pub trait AuditStore: AuditRepository + Clone + Send + Sync + 'static {}

impl<T> AuditStore for T where T: AuditRepository + Clone + Send + Sync + 'static {}
