//! Listing, lookup and integrity checks

use kernel::error::app_error::AppError;
use kernel::id::AuditLogId;
use std::sync::Arc;

use crate::domain::entity::audit_log::AuditLog;
use crate::domain::repository::{AuditRepository, LogFilter};
use crate::domain::value_object::content_hash::ContentHash;
use crate::error::{AuditError, AuditResult};

/// Outcome of re-hashing a stored audit entry
pub struct IntegrityReport {
    /// Entry as stored
    pub log: AuditLog,
    /// Hash recomputed from the stored content
    pub computed_hash: ContentHash,
    /// Recomputed hash equals the stored one
    pub intact: bool,
}

pub struct AuditQueryUseCase<R>
where
    R: AuditRepository,
{
    repo: Arc<R>,
}

impl<R> AuditQueryUseCase<R>
where
    R: AuditRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &LogFilter) -> AuditResult<Vec<AuditLog>> {
        self.repo.list_logs(filter).await
    }

    pub async fn get(&self, id: &str) -> AuditResult<AuditLog> {
        let id: AuditLogId = id.parse().map_err(AppError::from)?;
        self.repo.find_log(&id).await?.ok_or(AuditError::LogNotFound)
    }

    /// Recompute the content hash of a stored log
    pub async fn verify(&self, id: &str) -> AuditResult<IntegrityReport> {
        let log = self.get(id).await?;
        let computed_hash = log.record.content_hash();
        let intact = computed_hash == log.content_hash;
        if !intact {
            tracing::error!(
                log_id = %log.id,
                stored = %log.content_hash,
                computed = %computed_hash,
                "Audit log content does not match its hash"
            );
        }
        Ok(IntegrityReport {
            log,
            computed_hash,
            intact,
        })
    }
}
