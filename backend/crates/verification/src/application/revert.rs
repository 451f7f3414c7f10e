//! Own verification lookup and revert

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entity::id_verification::IdVerification;
use crate::domain::repository::VerificationRepository;
use crate::error::{VerificationError, VerificationResult};

pub struct MyVerificationUseCase<R>
where
    R: VerificationRepository,
{
    repo: Arc<R>,
}

impl<R> MyVerificationUseCase<R>
where
    R: VerificationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn latest(&self, user_id: &str) -> VerificationResult<Option<IdVerification>> {
        self.repo.latest_for_user(user_id).await
    }

    /// Withdraw the latest upload while it is pending and inside the window
    pub async fn revert(&self, user_id: &str, now: DateTime<Utc>) -> VerificationResult<IdVerification> {
        let latest = self
            .repo
            .latest_for_user(user_id)
            .await?
            .ok_or(VerificationError::NotFound)?;

        if !latest.can_revert_at(now) {
            return Err(VerificationError::NotRevertible);
        }
        // A review may land between the read and the delete
        if !self.repo.delete_revertible(&latest.id, now).await? {
            return Err(VerificationError::NotRevertible);
        }

        tracing::info!(verification_id = %latest.id, user_id = %user_id, "Identity upload reverted");
        Ok(latest)
    }

    pub async fn revert_now(&self, user_id: &str) -> VerificationResult<IdVerification> {
        self.revert(user_id, Utc::now()).await
    }
}
