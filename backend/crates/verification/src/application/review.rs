//! Reviewer listing and decisions

use chrono::Utc;
use kernel::error::app_error::AppError;
use kernel::id::IdVerificationId;
use kernel::role::UserRole;
use platform::actor::ActorContext;
use std::sync::Arc;

use crate::domain::entity::id_verification::{IdVerification, ReviewDecision, VerificationStatus};
use crate::domain::repository::VerificationRepository;
use crate::error::{VerificationError, VerificationResult};

pub const REVIEWER_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::LguStaff];

pub struct ReviewVerificationUseCase<R>
where
    R: VerificationRepository,
{
    repo: Arc<R>,
}

impl<R> ReviewVerificationUseCase<R>
where
    R: VerificationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        reviewer: &ActorContext,
        status: Option<VerificationStatus>,
        limit: i64,
    ) -> VerificationResult<Vec<IdVerification>> {
        reviewer.require_any_role(&REVIEWER_ROLES)?;
        self.repo.list_verifications(status, limit).await
    }

    pub async fn review(
        &self,
        reviewer: &ActorContext,
        id: &str,
        decision: ReviewDecision,
        reason: Option<String>,
    ) -> VerificationResult<IdVerification> {
        reviewer.require_any_role(&REVIEWER_ROLES)?;
        let id: IdVerificationId = id.parse().map_err(AppError::from)?;

        let mut verification = self
            .repo
            .find_verification(&id)
            .await?
            .ok_or(VerificationError::NotFound)?;

        verification.review(&reviewer.user_id, decision, reason, Utc::now())?;
        // The record may have left pending since it was read
        if !self.repo.update_verification(&verification).await? {
            return Err(VerificationError::NotPending);
        }

        tracing::info!(
            verification_id = %verification.id,
            reviewer_id = %reviewer.user_id,
            status = %verification.status,
            "Identity document reviewed"
        );
        Ok(verification)
    }
}
