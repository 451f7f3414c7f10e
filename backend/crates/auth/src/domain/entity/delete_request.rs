//! Delete Request
//!
//! Three-step account deletion: a six digit code is mailed, the code is
//! exchanged for a delete token, and the token confirms the deletion.
//! At most one request exists per user.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{constant_time_eq, hash_secret, random_numeric_code, random_token};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Outcome of a wrong code, decided from the stored attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAttempt {
    Wrong { remaining: i16 },
    /// Attempt budget spent; the request must be discarded
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub request_id: Uuid,
    pub user_id: UserId,
    /// Address the code was sent to
    pub email: String,
    pub code_hash: Vec<u8>,
    pub attempts: i16,
    pub verified: bool,
    pub delete_token_hash: Option<Vec<u8>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DeleteRequest {
    pub const CODE_DIGITS: u32 = 6;
    pub const CODE_TTL_MINUTES: i64 = 10;
    pub const MAX_ATTEMPTS: i16 = 5;
    pub const RESEND_COOLDOWN_SECS: i64 = 60;

    /// New request and its clear-text code
    pub fn new(user_id: UserId, email: String, now: DateTime<Utc>) -> (Self, String) {
        let code = random_numeric_code(Self::CODE_DIGITS);
        let request = Self {
            request_id: Uuid::new_v4(),
            user_id,
            email,
            code_hash: hash_secret(&code),
            attempts: 0,
            verified: false,
            delete_token_hash: None,
            expires_at: now + Duration::minutes(Self::CODE_TTL_MINUTES),
            created_at: now,
        };
        (request, code)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn blocks_resend_at(&self, now: DateTime<Utc>) -> bool {
        now < self.created_at + Duration::seconds(Self::RESEND_COOLDOWN_SECS)
    }

    pub fn matches_code(&self, code: &str) -> bool {
        constant_time_eq(&hash_secret(code), &self.code_hash)
    }

    /// Whether a correct code may still be accepted
    pub fn has_attempts_left(&self) -> bool {
        self.attempts < Self::MAX_ATTEMPTS
    }

    /// Clear-text delete token and the digest that is stored
    pub fn new_delete_token() -> (String, Vec<u8>) {
        let token = random_token(32);
        let hash = hash_secret(&token);
        (token, hash)
    }

    pub fn mark_verified(&mut self, delete_token_hash: Vec<u8>) {
        self.verified = true;
        self.delete_token_hash = Some(delete_token_hash);
    }

    /// `attempts` is the count after the failed one was recorded
    pub fn after_failed_attempt(attempts: i16) -> FailedAttempt {
        if attempts >= Self::MAX_ATTEMPTS {
            FailedAttempt::Exhausted
        } else {
            FailedAttempt::Wrong {
                remaining: Self::MAX_ATTEMPTS - attempts,
            }
        }
    }

    /// Verified and holding the matching delete token
    pub fn accepts_delete_token(&self, token: &str) -> bool {
        self.verified
            && self
                .delete_token_hash
                .as_deref()
                .is_some_and(|stored| constant_time_eq(&hash_secret(token), stored))
    }
}
