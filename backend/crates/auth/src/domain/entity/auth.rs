//! Auth Entity
//!
//! Credentials kept apart from the profile: password hash, TOTP state and
//! the brute-force counter.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{
    totp_secret::TotpSecret, user_id::UserId, user_password::UserPassword,
};

/// TOTP lifecycle: `None` (no secret), `Pending` (secret issued, never
/// confirmed by a code) and `Enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotpState {
    None,
    Pending,
    Enabled,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    pub totp_secret: Option<TotpSecret>,
    pub totp_enabled: bool,
    /// Consecutive failures since the last success
    pub login_failed_count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auth {
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            totp_secret: None,
            totp_enabled: false,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Count a failure; the fifth in a row locks the account
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        // An expired lock starts a fresh window
        if self.locked_until.is_some_and(|until| now >= until) {
            self.login_failed_count = 0;
            self.locked_until = None;
        }

        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }

    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    pub fn totp_state(&self) -> TotpState {
        match (&self.totp_secret, self.totp_enabled) {
            (None, _) => TotpState::None,
            (Some(_), false) => TotpState::Pending,
            (Some(_), true) => TotpState::Enabled,
        }
    }

    /// Replace any secret with a fresh pending one
    pub fn setup_totp(&mut self) -> TotpSecret {
        let secret = TotpSecret::generate();
        self.totp_secret = Some(secret.clone());
        self.totp_enabled = false;
        self.updated_at = Utc::now();
        secret
    }

    pub fn enable_totp(&mut self) {
        if self.totp_secret.is_some() {
            self.totp_enabled = true;
            self.updated_at = Utc::now();
        }
    }

    pub fn disable_totp(&mut self) {
        self.totp_secret = None;
        self.totp_enabled = false;
        self.updated_at = Utc::now();
    }

    pub fn update_password(&mut self, new_password: UserPassword) {
        self.password_hash = new_password;
        self.reset_failures();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;

    fn auth() -> Auth {
        let raw = RawPassword::new("Permit-Office-2024".into()).unwrap();
        Auth::new(UserId::new(), UserPassword::from_raw(&raw, None).unwrap())
    }

    #[test]
    fn test_lockout_after_five_failures() {
        let mut auth = auth();
        let now = Utc::now();
        for _ in 0..4 {
            auth.record_failure(now);
        }
        assert!(!auth.is_locked_at(now));

        auth.record_failure(now);
        assert!(auth.is_locked_at(now));
        assert!(auth.is_locked_at(now + Duration::minutes(14)));
        assert!(!auth.is_locked_at(now + Duration::minutes(15)));
    }

    #[test]
    fn test_failure_after_expired_lock_starts_new_window() {
        let mut auth = auth();
        let now = Utc::now();
        for _ in 0..5 {
            auth.record_failure(now);
        }
        let later = now + Duration::minutes(20);
        auth.record_failure(later);
        assert_eq!(auth.login_failed_count, 1);
        assert!(!auth.is_locked_at(later));
    }

    #[test]
    fn test_totp_states() {
        let mut auth = auth();
        assert_eq!(auth.totp_state(), TotpState::None);
        auth.setup_totp();
        assert_eq!(auth.totp_state(), TotpState::Pending);
        auth.enable_totp();
        assert_eq!(auth.totp_state(), TotpState::Enabled);
        auth.disable_totp();
        assert_eq!(auth.totp_state(), TotpState::None);
    }
}
