//! Expiry sweep for the auth store

use chrono::{DateTime, Utc};

use crate::domain::repository::AuthStore;
use crate::error::AuthResult;

/// Rows removed by one cleanup pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired sessions
    pub sessions: u64,
    /// Expired bootstrap tokens
    pub mfa_tokens: u64,
    /// Expired account deletion requests
    pub delete_requests: u64,
    /// Expired email and password tokens
    pub action_tokens: u64,
    /// Accounts whose deletion grace period ended
    pub purged_users: u64,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.sessions + self.mfa_tokens + self.delete_requests + self.action_tokens + self.purged_users
    }
}

pub async fn run_cleanup<R: AuthStore>(repo: &R, now: DateTime<Utc>) -> AuthResult<CleanupReport> {
    let report = CleanupReport {
        sessions: repo.cleanup_expired_sessions(now).await?,
        mfa_tokens: repo.cleanup_expired_mfa_tokens(now).await?,
        delete_requests: repo.cleanup_expired_delete_requests(now).await?,
        action_tokens: repo.cleanup_expired_action_tokens(now).await?,
        purged_users: repo.purge_deleted_users(now).await?,
    };

    if report.total() > 0 {
        tracing::info!(
            sessions = report.sessions,
            mfa_tokens = report.mfa_tokens,
            delete_requests = report.delete_requests,
            action_tokens = report.action_tokens,
            purged_users = report.purged_users,
            "Auth cleanup finished"
        );
    }
    Ok(report)
}

/// [`run_cleanup`] at the current time
pub async fn cleanup_now<R: AuthStore>(repo: &R) -> AuthResult<CleanupReport> {
    run_cleanup(repo, Utc::now()).await
}
