//! Upload Use Case

use chrono::Utc;
use std::sync::Arc;

use crate::application::config::VerificationConfig;
use crate::domain::entity::id_verification::{DocumentImages, DocumentType, IdVerification};
use crate::domain::repository::VerificationRepository;
use crate::error::{VerificationError, VerificationResult};

/// Identity document upload input
pub struct UploadInput {
    /// Kind of government ID shown in the images
    pub document_type: DocumentType,
    /// Storage URLs of the document images
    pub images: DocumentImages,
}

pub struct UploadVerificationUseCase<R>
where
    R: VerificationRepository,
{
    repo: Arc<R>,
    config: Arc<VerificationConfig>,
}

impl<R> UploadVerificationUseCase<R>
where
    R: VerificationRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<VerificationConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: &str, input: UploadInput) -> VerificationResult<IdVerification> {
        let latest = self.repo.latest_for_user(user_id).await?;
        if latest.is_some_and(|v| v.status.is_active()) {
            return Err(VerificationError::AlreadySubmitted);
        }

        let verification = IdVerification::new(
            user_id.to_string(),
            input.document_type,
            input.images,
            self.config.revert_window(),
            Utc::now(),
        );
        self.repo.insert_verification(&verification).await?;

        tracing::info!(
            verification_id = %verification.id,
            user_id = %user_id,
            document_type = %verification.document_type,
            "Identity document uploaded"
        );
        Ok(verification)
    }
}
