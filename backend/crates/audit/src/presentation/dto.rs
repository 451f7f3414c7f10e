//! API DTOs

use chrono::{DateTime, Utc};
use kernel::role::UserRole;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entity::audit_log::AuditLog;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordLogRequest {
    #[validate(length(min = 1, max = 100))]
    pub event_type: String,
    #[validate(length(min = 1, max = 50))]
    pub source: String,
    #[validate(length(min = 1, max = 64))]
    pub actor_id: Option<String>,
    pub actor_role: Option<UserRole>,
    #[validate(length(min = 1, max = 128))]
    pub target_id: Option<String>,
    #[validate(length(max = 64))]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Defaults to the time of receipt
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLogResponse {
    pub id: String,
    pub content_hash: String,
    pub anchor_status: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsQuery {
    pub actor_id: Option<String>,
    pub event_type: Option<String>,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200"))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: String,
    pub event_type: String,
    pub source: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<UserRole>,
    pub target_id: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
    pub content_hash: String,
    pub anchor_status: String,
    pub anchor_tx_hash: Option<String>,
    pub anchor_error: Option<String>,
    pub anchor_attempts: i16,
    pub anchored_at: Option<DateTime<Utc>>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id.to_string(),
            content_hash: log.content_hash.to_hex(),
            anchor_status: log.anchor.status.code().to_string(),
            anchor_tx_hash: log.anchor.tx_hash,
            anchor_error: log.anchor.error,
            anchor_attempts: log.anchor.attempts,
            anchored_at: log.anchor.anchored_at,
            event_type: log.record.event_type,
            source: log.record.source,
            actor_id: log.record.actor_id,
            actor_role: log.record.actor_role,
            target_id: log.record.target_id,
            ip_address: log.record.ip_address,
            metadata: log.record.metadata,
            occurred_at: log.record.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsResponse {
    pub logs: Vec<AuditLogResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLogResponse {
    pub id: String,
    pub intact: bool,
    pub stored_hash: String,
    pub computed_hash: String,
    pub anchor_status: String,
    pub anchor_tx_hash: Option<String>,
}
