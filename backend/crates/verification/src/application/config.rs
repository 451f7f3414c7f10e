//! Application Configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// How long after upload the user may withdraw it
    pub revert_window: Duration,
    /// Pending uploads older than this expire
    pub pending_expiry: Duration,
    pub max_page_size: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            revert_window: Duration::from_secs(24 * 3600),
            pending_expiry: Duration::from_secs(30 * 24 * 3600),
            max_page_size: 200,
        }
    }
}

impl VerificationConfig {
    pub fn development() -> Self {
        Self::default()
    }

    pub fn revert_window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.revert_window).unwrap_or(chrono::Duration::hours(24))
    }

    pub fn pending_expiry(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.pending_expiry).unwrap_or(chrono::Duration::days(30))
    }
}
