//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::IdVerificationId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::id_verification::{
    DocumentImages, DocumentType, IdVerification, VerificationStatus,
};
use crate::domain::repository::VerificationRepository;
use crate::error::{VerificationError, VerificationResult};

const VERIFICATION_COLUMNS: &str = r#"
    verification_id,
    user_id,
    document_type,
    front_image_url,
    back_image_url,
    selfie_image_url,
    status,
    uploaded_at,
    can_revert_until,
    reviewer_id,
    reviewed_at,
    rejection_reason,
    updated_at
"#;

#[derive(Clone)]
pub struct PgVerificationRepository {
    pool: PgPool,
}

impl PgVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl VerificationRepository for PgVerificationRepository {
    async fn insert_verification(&self, v: &IdVerification) -> VerificationResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO id_verifications (
                verification_id,
                user_id,
                document_type,
                front_image_url,
                back_image_url,
                selfie_image_url,
                status,
                uploaded_at,
                can_revert_until,
                reviewer_id,
                reviewed_at,
                rejection_reason,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(v.id.as_uuid())
        .bind(&v.user_id)
        .bind(v.document_type.code())
        .bind(&v.images.front)
        .bind(&v.images.back)
        .bind(&v.images.selfie)
        .bind(v.status.code())
        .bind(v.uploaded_at)
        .bind(v.can_revert_until)
        .bind(&v.reviewer_id)
        .bind(v.reviewed_at)
        .bind(&v.rejection_reason)
        .bind(v.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Partial unique index on active records per user
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(VerificationError::AlreadySubmitted)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_verification(
        &self,
        id: &IdVerificationId,
    ) -> VerificationResult<Option<IdVerification>> {
        let sql = format!(
            "SELECT {VERIFICATION_COLUMNS} FROM id_verifications WHERE verification_id = $1"
        );
        let row = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(VerificationRow::into_verification).transpose()
    }

    async fn latest_for_user(&self, user_id: &str) -> VerificationResult<Option<IdVerification>> {
        let sql = format!(
            r#"
            SELECT {VERIFICATION_COLUMNS} FROM id_verifications
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(VerificationRow::into_verification).transpose()
    }

    async fn list_verifications(
        &self,
        status: Option<VerificationStatus>,
        limit: i64,
    ) -> VerificationResult<Vec<IdVerification>> {
        let sql = format!(
            r#"
            SELECT {VERIFICATION_COLUMNS} FROM id_verifications
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY uploaded_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(status.map(|s| s.code()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(VerificationRow::into_verification).collect()
    }

    async fn update_verification(&self, v: &IdVerification) -> VerificationResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE id_verifications SET
                status = $2,
                reviewer_id = $3,
                reviewed_at = $4,
                rejection_reason = $5,
                updated_at = $6
            WHERE verification_id = $1
              AND status = 'pending'
            "#,
        )
        .bind(v.id.as_uuid())
        .bind(v.status.code())
        .bind(&v.reviewer_id)
        .bind(v.reviewed_at)
        .bind(&v.rejection_reason)
        .bind(v.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_revertible(
        &self,
        id: &IdVerificationId,
        now: DateTime<Utc>,
    ) -> VerificationResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM id_verifications
            WHERE verification_id = $1
              AND status = 'pending'
              AND can_revert_until >= $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> VerificationResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE id_verifications
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'pending' AND uploaded_at <= $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    verification_id: Uuid,
    user_id: String,
    document_type: String,
    front_image_url: String,
    back_image_url: Option<String>,
    selfie_image_url: Option<String>,
    status: String,
    uploaded_at: DateTime<Utc>,
    can_revert_until: DateTime<Utc>,
    reviewer_id: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    updated_at: DateTime<Utc>,
}

impl VerificationRow {
    fn into_verification(self) -> VerificationResult<IdVerification> {
        let document_type = DocumentType::from_code(&self.document_type).ok_or_else(|| {
            VerificationError::Internal(format!("Unknown document type: {}", self.document_type))
        })?;
        let status = VerificationStatus::from_code(&self.status).ok_or_else(|| {
            VerificationError::Internal(format!("Unknown verification status: {}", self.status))
        })?;

        Ok(IdVerification {
            id: IdVerificationId::from_uuid(self.verification_id),
            user_id: self.user_id,
            document_type,
            images: DocumentImages {
                front: self.front_image_url,
                back: self.back_image_url,
                selfie: self.selfie_image_url,
            },
            status,
            uploaded_at: self.uploaded_at,
            can_revert_until: self.can_revert_until,
            reviewer_id: self.reviewer_id,
            reviewed_at: self.reviewed_at,
            rejection_reason: self.rejection_reason,
            updated_at: self.updated_at,
        })
    }
}
