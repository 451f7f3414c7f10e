//! Expiry sweep for unreviewed uploads

use chrono::{DateTime, Utc};

use crate::application::config::VerificationConfig;
use crate::domain::repository::VerificationRepository;
use crate::error::VerificationResult;

pub async fn expire_stale<R: VerificationRepository>(
    repo: &R,
    config: &VerificationConfig,
    now: DateTime<Utc>,
) -> VerificationResult<u64> {
    let expired = repo.expire_pending_before(now - config.pending_expiry()).await?;
    if expired > 0 {
        tracing::info!(expired, "Expired unreviewed identity uploads");
    }
    Ok(expired)
}
