//! ID Verification Entity
//!
//! Metadata of an identity document upload. The images themselves live in
//! object storage; only their URLs are kept here.

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use kernel::id::IdVerificationId;
use serde::{Deserialize, Serialize};

use crate::error::{VerificationError, VerificationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[display("national_id")]
    NationalId,
    #[display("passport")]
    Passport,
    #[display("drivers_license")]
    DriversLicense,
    #[display("umid")]
    Umid,
    #[display("other")]
    Other,
}

impl DocumentType {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::NationalId => "national_id",
            DocumentType::Passport => "passport",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::Umid => "umid",
            DocumentType::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "national_id" => Some(DocumentType::NationalId),
            "passport" => Some(DocumentType::Passport),
            "drivers_license" => Some(DocumentType::DriversLicense),
            "umid" => Some(DocumentType::Umid),
            "other" => Some(DocumentType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[display("pending")]
    Pending,
    #[display("verified")]
    Verified,
    #[display("rejected")]
    Rejected,
    /// Never reviewed within the expiry period
    #[display("expired")]
    Expired,
}

impl VerificationStatus {
    pub fn code(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::Expired => "expired",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            "rejected" => Some(VerificationStatus::Rejected),
            "expired" => Some(VerificationStatus::Expired),
            _ => None,
        }
    }

    /// Statuses that stop the user from uploading again
    pub fn is_active(&self) -> bool {
        matches!(self, VerificationStatus::Pending | VerificationStatus::Verified)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Verified,
    Rejected,
}

/// Image URLs of one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentImages {
    pub front: String,
    pub back: Option<String>,
    pub selfie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdVerification {
    pub id: IdVerificationId,
    /// Public id of the uploading user
    pub user_id: String,
    pub document_type: DocumentType,
    pub images: DocumentImages,
    pub status: VerificationStatus,
    pub uploaded_at: DateTime<Utc>,
    pub can_revert_until: DateTime<Utc>,
    pub reviewer_id: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl IdVerification {
    pub fn new(
        user_id: String,
        document_type: DocumentType,
        images: DocumentImages,
        revert_window: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IdVerificationId::new(),
            user_id,
            document_type,
            images,
            status: VerificationStatus::Pending,
            uploaded_at: now,
            can_revert_until: now + revert_window,
            reviewer_id: None,
            reviewed_at: None,
            rejection_reason: None,
            updated_at: now,
        }
    }

    /// Pending and still inside the revert window (inclusive)
    pub fn can_revert_at(&self, now: DateTime<Utc>) -> bool {
        self.status == VerificationStatus::Pending && now <= self.can_revert_until
    }

    pub fn review(
        &mut self,
        reviewer_id: &str,
        decision: ReviewDecision,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> VerificationResult<()> {
        if self.user_id == reviewer_id {
            return Err(VerificationError::SelfReview);
        }
        if self.status != VerificationStatus::Pending {
            return Err(VerificationError::NotPending);
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        match decision {
            ReviewDecision::Verified => {
                self.status = VerificationStatus::Verified;
                self.rejection_reason = None;
            }
            ReviewDecision::Rejected => {
                let reason = reason.ok_or(VerificationError::ReasonRequired)?;
                self.status = VerificationStatus::Rejected;
                self.rejection_reason = Some(reason);
            }
        }

        self.reviewer_id = Some(reviewer_id.to_string());
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(now: DateTime<Utc>) -> IdVerification {
        IdVerification::new(
            "user-1".into(),
            DocumentType::Passport,
            DocumentImages {
                front: "https://files.example.ph/front.jpg".into(),
                back: None,
                selfie: None,
            },
            Duration::hours(24),
            now,
        )
    }

    #[test]
    fn test_revert_window_edges() {
        let now = Utc::now();
        let v = upload(now);
        assert!(v.can_revert_at(now + Duration::hours(23) + Duration::minutes(59)));
        assert!(v.can_revert_at(now + Duration::hours(24)));
        assert!(!v.can_revert_at(now + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn test_reviewed_upload_cannot_be_reverted() {
        let now = Utc::now();
        let mut v = upload(now);
        v.review("staff-1", ReviewDecision::Verified, None, now).unwrap();
        assert!(!v.can_revert_at(now));
    }

    #[test]
    fn test_rejection_needs_reason() {
        let now = Utc::now();
        let mut v = upload(now);
        let err = v
            .review("staff-1", ReviewDecision::Rejected, Some("   ".into()), now)
            .unwrap_err();
        assert!(matches!(err, VerificationError::ReasonRequired));
        assert_eq!(v.status, VerificationStatus::Pending);

        v.review("staff-1", ReviewDecision::Rejected, Some("Blurry photo".into()), now)
            .unwrap();
        assert_eq!(v.status, VerificationStatus::Rejected);
        assert_eq!(v.rejection_reason.as_deref(), Some("Blurry photo"));
        assert_eq!(v.reviewer_id.as_deref(), Some("staff-1"));
    }

    #[test]
    fn test_review_only_once_and_never_self() {
        let now = Utc::now();
        let mut v = upload(now);
        assert!(matches!(
            v.review("user-1", ReviewDecision::Verified, None, now),
            Err(VerificationError::SelfReview)
        ));

        v.review("staff-1", ReviewDecision::Verified, None, now).unwrap();
        assert!(matches!(
            v.review("staff-2", ReviewDecision::Rejected, Some("x".into()), now),
            Err(VerificationError::NotPending)
        ));
    }

    #[test]
    fn test_codes_round_trip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Verified,
            VerificationStatus::Rejected,
            VerificationStatus::Expired,
        ] {
            assert_eq!(VerificationStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(DocumentType::from_code("umid"), Some(DocumentType::Umid));
        assert_eq!(DocumentType::from_code("library_card"), None);
    }
}
