//! Anchoring of content hashes and the retry backlog

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::config::AuditConfig;
use crate::domain::anchor::Anchor;
use crate::domain::entity::audit_log::AuditLog;
use crate::domain::repository::AuditRepository;
use crate::error::AuditResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BacklogReport {
    /// Unanchored entries picked up in this pass
    pub attempted: usize,
    pub anchored: usize,
    /// Entries whose anchoring failed again
    pub failed: usize,
}

pub struct AnchorUseCase<R, A>
where
    R: AuditRepository,
    A: Anchor,
{
    repo: Arc<R>,
    anchor: Arc<A>,
    config: Arc<AuditConfig>,
}

impl<R, A> Clone for AnchorUseCase<R, A>
where
    R: AuditRepository,
    A: Anchor,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            anchor: self.anchor.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, A> AnchorUseCase<R, A>
where
    R: AuditRepository + Sync + 'static,
    A: Anchor + Sync + 'static,
{
    pub fn new(repo: Arc<R>, anchor: Arc<A>, config: Arc<AuditConfig>) -> Self {
        Self {
            repo,
            anchor,
            config,
        }
    }

    /// One anchor attempt; the outcome is stored on the log either way
    pub async fn anchor_log(&self, mut log: AuditLog) -> AuditResult<AuditLog> {
        if !log.needs_anchor() {
            return Ok(log);
        }

        match self.anchor.anchor(&log.content_hash, &log.record.source).await {
            Ok(tx_hash) => {
                tracing::info!(log_id = %log.id, tx_hash = %tx_hash, "Audit log anchored");
                log.mark_anchored(tx_hash, Utc::now());
            }
            Err(e) => {
                tracing::warn!(
                    log_id = %log.id,
                    attempt = log.anchor.attempts + 1,
                    error = %e,
                    "Audit log anchoring failed"
                );
                log.mark_failed(e.to_string());
            }
        }

        self.repo.update_anchor(&log.id, &log.anchor).await?;
        Ok(log)
    }

    /// Anchor in the background
    pub fn spawn(&self, log: AuditLog) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.anchor_log(log).await {
                tracing::error!(error = %e, "Could not store anchor outcome");
            }
        });
    }

    /// Retry stale pending logs and failed logs with attempts left
    pub async fn retry_backlog(&self, now: DateTime<Utc>) -> AuditResult<BacklogReport> {
        let backlog = self
            .repo
            .anchor_backlog(
                now - self.config.backlog_grace(),
                AuditLog::MAX_ANCHOR_ATTEMPTS,
                self.config.backlog_batch,
            )
            .await?;

        let mut report = BacklogReport::default();
        for log in backlog {
            report.attempted += 1;
            let log = self.anchor_log(log).await?;
            if log.anchor.tx_hash.is_some() {
                report.anchored += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                anchored = report.anchored,
                failed = report.failed,
                "Anchor backlog pass finished"
            );
        }
        Ok(report)
    }
}
