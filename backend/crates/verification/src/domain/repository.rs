//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::IdVerificationId;

use crate::domain::entity::id_verification::{IdVerification, VerificationStatus};
use crate::error::VerificationResult;

#[trait_variant::make(VerificationRepository: Send)]
pub trait LocalVerificationRepository {
    /// Fails with `AlreadySubmitted` when the user has an active record
    async fn insert_verification(&self, verification: &IdVerification) -> VerificationResult<()>;

    async fn find_verification(
        &self,
        id: &IdVerificationId,
    ) -> VerificationResult<Option<IdVerification>>;

    /// Most recent upload of a user, whatever its status
    async fn latest_for_user(&self, user_id: &str) -> VerificationResult<Option<IdVerification>>;

    /// Newest first
    async fn list_verifications(
        &self,
        status: Option<VerificationStatus>,
        limit: i64,
    ) -> VerificationResult<Vec<IdVerification>>;

    /// Write a review outcome onto a record that is still pending; false
    /// once the record has left the pending state
    async fn update_verification(&self, verification: &IdVerification) -> VerificationResult<bool>;

    /// Delete a pending upload whose revert window includes `now`; false
    /// when nothing matched
    async fn delete_revertible(
        &self,
        id: &IdVerificationId,
        now: DateTime<Utc>,
    ) -> VerificationResult<bool>;

    /// Mark pending uploads made at or before `cutoff` as expired
    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> VerificationResult<u64>;
}

pub trait VerificationStore: VerificationRepository + Clone + Send + Sync + 'static {}

impl<T> VerificationStore for T where T: VerificationRepository + Clone + Send + Sync + 'static {}
