//! Record Log Use Case

use chrono::Utc;
use std::sync::Arc;

use crate::domain::entity::audit_log::{AuditLog, AuditRecord};
use crate::domain::repository::AuditRepository;
use crate::error::AuditResult;

pub struct RecordLogUseCase<R>
where
    R: AuditRepository,
{
    repo: Arc<R>,
    anchoring_enabled: bool,
}

impl<R> RecordLogUseCase<R>
where
    R: AuditRepository,
{
    pub fn new(repo: Arc<R>, anchoring_enabled: bool) -> Self {
        Self {
            repo,
            anchoring_enabled,
        }
    }

    /// Hash and store `record`. Anchoring happens separately.
    pub async fn execute(&self, record: AuditRecord) -> AuditResult<AuditLog> {
        let log = AuditLog::new(record, self.anchoring_enabled, Utc::now());
        self.repo.insert_log(&log).await?;

        tracing::info!(
            log_id = %log.id,
            event_type = %log.record.event_type,
            source = %log.record.source,
            content_hash = %log.content_hash,
            anchor_status = %log.anchor.status,
            "Audit log recorded"
        );
        Ok(log)
    }
}
