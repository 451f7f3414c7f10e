//! In-memory audit store for tests

use chrono::{DateTime, Utc};
use kernel::id::AuditLogId;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entity::audit_log::{AnchorState, AuditLog};
use crate::domain::repository::{AuditRepository, LogFilter};
use crate::domain::value_object::anchor_status::AnchorStatus;
use crate::error::AuditResult;

#[derive(Clone, Default)]
pub struct MemoryAuditRepository {
    logs: Arc<Mutex<Vec<AuditLog>>>,
}

impl MemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditLog>> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Rewrite a stored log in place
    pub fn tamper(&self, id: &AuditLogId, edit: impl FnOnce(&mut AuditLog)) {
        if let Some(log) = self.lock().iter_mut().find(|l| l.id == *id) {
            edit(log);
        }
    }
}

impl AuditRepository for MemoryAuditRepository {
    async fn insert_log(&self, log: &AuditLog) -> AuditResult<()> {
        self.lock().push(log.clone());
        Ok(())
    }

    async fn find_log(&self, id: &AuditLogId) -> AuditResult<Option<AuditLog>> {
        Ok(self.lock().iter().find(|l| l.id == *id).cloned())
    }

    async fn list_logs(&self, filter: &LogFilter) -> AuditResult<Vec<AuditLog>> {
        let mut logs: Vec<AuditLog> = self
            .lock()
            .iter()
            .filter(|l| {
                filter
                    .actor_id
                    .as_ref()
                    .is_none_or(|a| l.record.actor_id.as_ref() == Some(a))
            })
            .filter(|l| {
                filter
                    .event_type
                    .as_ref()
                    .is_none_or(|t| &l.record.event_type == t)
            })
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.record.occurred_at.cmp(&a.record.occurred_at));
        logs.truncate(filter.limit.max(0) as usize);
        Ok(logs)
    }

    async fn update_anchor(&self, id: &AuditLogId, anchor: &AnchorState) -> AuditResult<()> {
        if let Some(log) = self.lock().iter_mut().find(|l| l.id == *id) {
            log.anchor = anchor.clone();
        }
        Ok(())
    }

    async fn anchor_backlog(
        &self,
        stale_before: DateTime<Utc>,
        max_attempts: i16,
        limit: i64,
    ) -> AuditResult<Vec<AuditLog>> {
        let mut logs: Vec<AuditLog> = self
            .lock()
            .iter()
            .filter(|l| match l.anchor.status {
                AnchorStatus::Pending => l.created_at < stale_before,
                AnchorStatus::Failed => l.anchor.attempts < max_attempts,
                _ => false,
            })
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.created_at);
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }
}
