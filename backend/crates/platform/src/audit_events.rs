//! Audit event emission
//!
//! Services describe security-relevant mutations as [`AuditEvent`]s and hand
//! them to an [`AuditEmitter`]. The receiving end is drained by the audit
//! service's forwarder. Emitting never fails the request that triggered it.

use chrono::{DateTime, Utc};
use kernel::role::UserRole;
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_type: String,
    /// Emitting service
    pub source: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<UserRole>,
    pub target_id: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            actor_id: None,
            actor_role: None,
            target_id: None,
            ip_address: None,
            metadata: serde_json::Value::Null,
            occurred_at: Utc::now(),
        }
    }

    pub fn actor(mut self, actor_id: impl Into<String>, role: UserRole) -> Self {
        self.actor_id = Some(actor_id.into());
        self.actor_role = Some(role);
        self
    }

    pub fn target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Sending half of the audit channel
#[derive(Debug, Clone, Default)]
pub struct AuditEmitter {
    tx: Option<mpsc::UnboundedSender<AuditEvent>>,
}

impl AuditEmitter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn emit(&self, event: AuditEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(mpsc::error::SendError(event)) = tx.send(event) {
            tracing::warn!(
                event_type = %event.event_type,
                source = %event.source,
                "Audit channel closed; event dropped"
            );
        }
    }
}
