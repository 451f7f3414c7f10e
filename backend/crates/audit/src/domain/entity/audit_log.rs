//! Audit Log Entity

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use kernel::id::AuditLogId;
use kernel::role::UserRole;
use platform::audit_events::AuditEvent;
use serde_json::json;

use crate::domain::value_object::{anchor_status::AnchorStatus, content_hash::ContentHash};

/// The hashed part of a log
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub event_type: String,
    pub source: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<UserRole>,
    pub target_id: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
    /// Millisecond precision so the value survives storage unchanged
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            actor_id: None,
            actor_role: None,
            target_id: None,
            ip_address: None,
            metadata: serde_json::Value::Null,
            occurred_at: occurred_at.trunc_subsecs(3),
        }
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_value(&json!({
            "eventType": self.event_type,
            "source": self.source,
            "actorId": self.actor_id,
            "actorRole": self.actor_role.map(|r| r.code()),
            "targetId": self.target_id,
            "ipAddress": self.ip_address,
            "metadata": self.metadata,
            "occurredAt": self.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }
}

impl From<AuditEvent> for AuditRecord {
    fn from(event: AuditEvent) -> Self {
        let mut record = AuditRecord::new(event.event_type, event.source, event.occurred_at);
        record.actor_id = event.actor_id;
        record.actor_role = event.actor_role;
        record.target_id = event.target_id;
        record.ip_address = event.ip_address;
        record.metadata = event.metadata;
        record
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorState {
    pub status: AnchorStatus,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
    pub attempts: i16,
    pub anchored_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub record: AuditRecord,
    pub content_hash: ContentHash,
    pub anchor: AnchorState,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Attempts after which a failed anchor is left alone
    pub const MAX_ANCHOR_ATTEMPTS: i16 = 5;

    pub fn new(record: AuditRecord, anchoring_enabled: bool, now: DateTime<Utc>) -> Self {
        let status = if anchoring_enabled {
            AnchorStatus::Pending
        } else {
            AnchorStatus::Disabled
        };
        Self {
            id: AuditLogId::new(),
            content_hash: record.content_hash(),
            record,
            anchor: AnchorState {
                status,
                tx_hash: None,
                error: None,
                attempts: 0,
                anchored_at: None,
            },
            created_at: now,
        }
    }

    /// Stored hash still matches the stored content
    pub fn is_intact(&self) -> bool {
        self.record.content_hash() == self.content_hash
    }

    pub fn needs_anchor(&self) -> bool {
        match self.anchor.status {
            AnchorStatus::Pending => true,
            AnchorStatus::Failed => self.anchor.attempts < Self::MAX_ANCHOR_ATTEMPTS,
            AnchorStatus::Disabled | AnchorStatus::Anchored => false,
        }
    }

    pub fn mark_anchored(&mut self, tx_hash: String, now: DateTime<Utc>) {
        self.anchor.status = AnchorStatus::Anchored;
        self.anchor.tx_hash = Some(tx_hash);
        self.anchor.error = None;
        self.anchor.attempts += 1;
        self.anchor.anchored_at = Some(now);
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.anchor.status = AnchorStatus::Failed;
        self.anchor.error = Some(error.into());
        self.anchor.attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> AuditRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let mut record = AuditRecord::new("verification.reviewed", "verification", at);
        record.actor_id = Some("staff-1".into());
        record.actor_role = Some(UserRole::LguStaff);
        record.metadata = json!({ "decision": "verified" });
        record
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(record().content_hash(), record().content_hash());
    }

    #[test]
    fn test_occurred_at_is_truncated_to_millis() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let record = AuditRecord::new("x", "y", precise);
        assert_eq!(record.occurred_at.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_tampering_is_detected() {
        let mut log = AuditLog::new(record(), false, Utc::now());
        assert!(log.is_intact());
        assert_eq!(log.anchor.status, AnchorStatus::Disabled);

        log.record.metadata = json!({ "decision": "rejected" });
        assert!(!log.is_intact());
    }

    #[test]
    fn test_failed_anchor_retries_are_bounded() {
        let mut log = AuditLog::new(record(), true, Utc::now());
        assert!(log.needs_anchor());

        for _ in 0..AuditLog::MAX_ANCHOR_ATTEMPTS - 1 {
            log.mark_failed("node unreachable");
            assert!(log.needs_anchor());
        }
        log.mark_failed("node unreachable");
        assert_eq!(log.anchor.attempts, AuditLog::MAX_ANCHOR_ATTEMPTS);
        assert!(!log.needs_anchor());
    }

    #[test]
    fn test_anchored_clears_error() {
        let mut log = AuditLog::new(record(), true, Utc::now());
        log.mark_failed("timeout");
        log.mark_anchored("0xabc".into(), Utc::now());
        assert_eq!(log.anchor.status, AnchorStatus::Anchored);
        assert_eq!(log.anchor.error, None);
        assert!(!log.needs_anchor());
    }
}
