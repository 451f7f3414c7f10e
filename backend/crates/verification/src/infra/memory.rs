//! In-memory verification store for tests

use chrono::{DateTime, Utc};
use kernel::id::IdVerificationId;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entity::id_verification::{IdVerification, VerificationStatus};
use crate::domain::repository::VerificationRepository;
use crate::error::{VerificationError, VerificationResult};

#[derive(Clone, Default)]
pub struct MemoryVerificationRepository {
    rows: Arc<Mutex<Vec<IdVerification>>>,
}

impl MemoryVerificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<IdVerification>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move every upload timestamp back by `by`
    pub fn age_uploads(&self, by: chrono::Duration) {
        for row in self.lock().iter_mut() {
            row.uploaded_at -= by;
            row.can_revert_until -= by;
        }
    }
}

impl VerificationRepository for MemoryVerificationRepository {
    async fn insert_verification(&self, v: &IdVerification) -> VerificationResult<()> {
        let mut rows = self.lock();
        if rows
            .iter()
            .any(|r| r.user_id == v.user_id && r.status.is_active())
        {
            return Err(VerificationError::AlreadySubmitted);
        }
        rows.push(v.clone());
        Ok(())
    }

    async fn find_verification(
        &self,
        id: &IdVerificationId,
    ) -> VerificationResult<Option<IdVerification>> {
        Ok(self.lock().iter().find(|r| r.id == *id).cloned())
    }

    async fn latest_for_user(&self, user_id: &str) -> VerificationResult<Option<IdVerification>> {
        Ok(self
            .lock()
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.uploaded_at)
            .cloned())
    }

    async fn list_verifications(
        &self,
        status: Option<VerificationStatus>,
        limit: i64,
    ) -> VerificationResult<Vec<IdVerification>> {
        let mut rows: Vec<IdVerification> = self
            .lock()
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn update_verification(&self, v: &IdVerification) -> VerificationResult<bool> {
        let mut rows = self.lock();
        match rows
            .iter_mut()
            .find(|r| r.id == v.id && r.status == VerificationStatus::Pending)
        {
            Some(row) => {
                *row = v.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_revertible(
        &self,
        id: &IdVerificationId,
        now: DateTime<Utc>,
    ) -> VerificationResult<bool> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|r| !(r.id == *id && r.can_revert_at(now)));
        Ok(rows.len() < before)
    }

    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> VerificationResult<u64> {
        let mut expired = 0;
        for row in self.lock().iter_mut() {
            if row.status == VerificationStatus::Pending && row.uploaded_at <= cutoff {
                row.status = VerificationStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }
}
