//! In-process audit event forwarder
//!
//! Drains the receiving half of `platform::audit_events::AuditEmitter` into
//! the log store. Runs until every emitter has been dropped.

use platform::audit_events::AuditEvent;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::application::anchoring::AnchorUseCase;
use crate::application::record::RecordLogUseCase;
use crate::domain::anchor::Anchor;
use crate::domain::entity::audit_log::AuditRecord;
use crate::domain::repository::AuditRepository;

pub async fn run_forwarder<R, A>(
    mut rx: UnboundedReceiver<AuditEvent>,
    repo: Arc<R>,
    anchoring: Option<AnchorUseCase<R, A>>,
) -> u64
where
    R: AuditRepository + Sync + 'static,
    A: Anchor + Sync + 'static,
{
    let record = RecordLogUseCase::new(repo, anchoring.is_some());
    let mut forwarded = 0u64;

    while let Some(event) = rx.recv().await {
        let event_type = event.event_type.clone();
        match record.execute(AuditRecord::from(event)).await {
            Ok(log) => {
                forwarded += 1;
                if let Some(anchoring) = &anchoring {
                    anchoring.spawn(log);
                }
            }
            // Losing an event must not stop the forwarder
            Err(e) => tracing::error!(error = %e, event_type = %event_type, "Audit event not stored"),
        }
    }

    tracing::info!(forwarded, "Audit forwarder stopped");
    forwarded
}

pub fn spawn_forwarder<R, A>(
    rx: UnboundedReceiver<AuditEvent>,
    repo: Arc<R>,
    anchoring: Option<AnchorUseCase<R, A>>,
) -> JoinHandle<u64>
where
    R: AuditRepository + Sync + 'static,
    A: Anchor + Sync + 'static,
{
    tokio::spawn(run_forwarder(rx, repo, anchoring))
}
