//! API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entity::id_verification::{
    DocumentType, IdVerification, ReviewDecision, VerificationStatus,
};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadVerificationRequest {
    pub document_type: DocumentType,
    #[validate(url(message = "must be a URL"), length(max = 2048))]
    pub front_image_url: String,
    #[validate(url(message = "must be a URL"), length(max = 2048))]
    pub back_image_url: Option<String>,
    #[validate(url(message = "must be a URL"), length(max = 2048))]
    pub selfie_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListVerificationsQuery {
    pub status: Option<VerificationStatus>,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200"))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub id: String,
    pub user_id: String,
    pub document_type: DocumentType,
    pub front_image_url: String,
    pub back_image_url: Option<String>,
    pub selfie_image_url: Option<String>,
    pub status: VerificationStatus,
    pub uploaded_at: DateTime<Utc>,
    pub can_revert_until: DateTime<Utc>,
    pub can_revert: bool,
    pub reviewer_id: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl VerificationResponse {
    pub fn at(v: IdVerification, now: DateTime<Utc>) -> Self {
        Self {
            can_revert: v.can_revert_at(now),
            id: v.id.to_string(),
            user_id: v.user_id,
            document_type: v.document_type,
            front_image_url: v.images.front,
            back_image_url: v.images.back,
            selfie_image_url: v.images.selfie,
            status: v.status,
            uploaded_at: v.uploaded_at,
            can_revert_until: v.can_revert_until,
            reviewer_id: v.reviewer_id,
            reviewed_at: v.reviewed_at,
            rejection_reason: v.rejection_reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVerificationResponse {
    /// `null` when nothing was uploaded
    pub verification: Option<VerificationResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVerificationsResponse {
    pub verifications: Vec<VerificationResponse>,
}
