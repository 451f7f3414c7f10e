//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::AuditLogId;
use kernel::role::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::audit_log::{AnchorState, AuditLog, AuditRecord};
use crate::domain::repository::{AuditRepository, LogFilter};
use crate::domain::value_object::{
    anchor_status::AnchorStatus,
    content_hash::{ContentHash, canonical_json},
};
use crate::error::{AuditError, AuditResult};

const LOG_COLUMNS: &str = r#"
    log_id,
    event_type,
    source,
    actor_id,
    actor_role,
    target_id,
    ip_address,
    metadata,
    occurred_at,
    content_hash,
    anchor_status,
    anchor_tx_hash,
    anchor_error,
    anchor_attempts,
    anchored_at,
    created_at
"#;

#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AuditRepository for PgAuditRepository {
    async fn insert_log(&self, log: &AuditLog) -> AuditResult<()> {
        let record = &log.record;
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                log_id,
                event_type,
                source,
                actor_id,
                actor_role,
                target_id,
                ip_address,
                metadata,
                occurred_at,
                content_hash,
                anchor_status,
                anchor_tx_hash,
                anchor_error,
                anchor_attempts,
                anchored_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(log.id.as_uuid())
        .bind(&record.event_type)
        .bind(&record.source)
        .bind(&record.actor_id)
        .bind(record.actor_role.map(|r| r.id()))
        .bind(&record.target_id)
        .bind(&record.ip_address)
        .bind(canonical_json(&record.metadata))
        .bind(record.occurred_at)
        .bind(log.content_hash.as_bytes().as_slice())
        .bind(log.anchor.status.code())
        .bind(&log.anchor.tx_hash)
        .bind(&log.anchor.error)
        .bind(log.anchor.attempts)
        .bind(log.anchor.anchored_at)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_log(&self, id: &AuditLogId) -> AuditResult<Option<AuditLog>> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM audit_logs WHERE log_id = $1");
        let row = sqlx::query_as::<_, AuditLogRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AuditLogRow::into_log).transpose()
    }

    async fn list_logs(&self, filter: &LogFilter) -> AuditResult<Vec<AuditLog>> {
        let sql = format!(
            r#"
            SELECT {LOG_COLUMNS} FROM audit_logs
            WHERE ($1::text IS NULL OR actor_id = $1)
              AND ($2::text IS NULL OR event_type = $2)
            ORDER BY occurred_at DESC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
            .bind(&filter.actor_id)
            .bind(&filter.event_type)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AuditLogRow::into_log).collect()
    }

    async fn update_anchor(&self, id: &AuditLogId, anchor: &AnchorState) -> AuditResult<()> {
        sqlx::query(
            r#"
            UPDATE audit_logs SET
                anchor_status = $2,
                anchor_tx_hash = $3,
                anchor_error = $4,
                anchor_attempts = $5,
                anchored_at = $6
            WHERE log_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(anchor.status.code())
        .bind(&anchor.tx_hash)
        .bind(&anchor.error)
        .bind(anchor.attempts)
        .bind(anchor.anchored_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn anchor_backlog(
        &self,
        stale_before: DateTime<Utc>,
        max_attempts: i16,
        limit: i64,
    ) -> AuditResult<Vec<AuditLog>> {
        let sql = format!(
            r#"
            SELECT {LOG_COLUMNS} FROM audit_logs
            WHERE (anchor_status = 'pending' AND created_at < $1)
               OR (anchor_status = 'failed' AND anchor_attempts < $2)
            ORDER BY created_at ASC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
            .bind(stale_before)
            .bind(max_attempts)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AuditLogRow::into_log).collect()
    }
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    log_id: Uuid,
    event_type: String,
    source: String,
    actor_id: Option<String>,
    actor_role: Option<i16>,
    target_id: Option<String>,
    ip_address: Option<String>,
    metadata: String,
    occurred_at: DateTime<Utc>,
    content_hash: Vec<u8>,
    anchor_status: String,
    anchor_tx_hash: Option<String>,
    anchor_error: Option<String>,
    anchor_attempts: i16,
    anchored_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl AuditLogRow {
    fn into_log(self) -> AuditResult<AuditLog> {
        let content_hash: [u8; 32] = self
            .content_hash
            .try_into()
            .map_err(|_| AuditError::Internal(format!("Bad content hash on log {}", self.log_id)))?;
        let status = AnchorStatus::from_code(&self.anchor_status).ok_or_else(|| {
            AuditError::Internal(format!("Unknown anchor status: {}", self.anchor_status))
        })?;
        let metadata = serde_json::from_str(&self.metadata)
            .map_err(|e| AuditError::Internal(format!("Bad metadata on log {}: {e}", self.log_id)))?;

        Ok(AuditLog {
            id: AuditLogId::from_uuid(self.log_id),
            record: AuditRecord {
                event_type: self.event_type,
                source: self.source,
                actor_id: self.actor_id,
                actor_role: self.actor_role.and_then(UserRole::from_id),
                target_id: self.target_id,
                ip_address: self.ip_address,
                metadata,
                occurred_at: self.occurred_at,
            },
            content_hash: ContentHash::from_bytes(content_hash),
            anchor: AnchorState {
                status,
                tx_hash: self.anchor_tx_hash,
                error: self.anchor_error,
                attempts: self.anchor_attempts,
                anchored_at: self.anchored_at,
            },
            created_at: self.created_at,
        })
    }
}
