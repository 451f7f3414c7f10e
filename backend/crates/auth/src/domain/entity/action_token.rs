//! Action Token
//!
//! Single-use emailed link tokens.

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use platform::crypto::{hash_secret, random_token};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ActionPurpose {
    #[display("password_reset")]
    PasswordReset,
    #[display("email_change")]
    EmailChange,
    #[display("email_verification")]
    EmailVerification,
}

impl ActionPurpose {
    pub fn ttl(&self) -> Duration {
        match self {
            Self::PasswordReset => Duration::hours(1),
            Self::EmailChange | Self::EmailVerification => Duration::hours(24),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::EmailChange => "email_change",
            Self::EmailVerification => "email_verification",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "password_reset" => Some(Self::PasswordReset),
            "email_change" => Some(Self::EmailChange),
            "email_verification" => Some(Self::EmailVerification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionToken {
    pub token_id: Uuid,
    pub user_id: UserId,
    pub purpose: ActionPurpose,
    pub secret_hash: Vec<u8>,
    /// Target address of an email change
    pub new_email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ActionToken {
    pub fn issue(
        user_id: UserId,
        purpose: ActionPurpose,
        new_email: Option<String>,
        now: DateTime<Utc>,
    ) -> (Self, String) {
        let secret = random_token(32);
        let token = Self {
            token_id: Uuid::new_v4(),
            user_id,
            purpose,
            secret_hash: hash_secret(&secret),
            new_email,
            expires_at: now + purpose.ttl(),
            used_at: None,
            created_at: now,
        };
        (token, secret)
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls() {
        let now = Utc::now();
        let (reset, _) = ActionToken::issue(UserId::new(), ActionPurpose::PasswordReset, None, now);
        assert!(reset.is_usable_at(now + Duration::minutes(59)));
        assert!(!reset.is_usable_at(now + Duration::minutes(60)));

        let (verify, _) =
            ActionToken::issue(UserId::new(), ActionPurpose::EmailVerification, None, now);
        assert!(verify.is_usable_at(now + Duration::hours(23)));
    }

    #[test]
    fn test_purpose_codes() {
        for purpose in [
            ActionPurpose::PasswordReset,
            ActionPurpose::EmailChange,
            ActionPurpose::EmailVerification,
        ] {
            assert_eq!(ActionPurpose::from_code(purpose.code()), Some(purpose));
            assert_eq!(purpose.to_string(), purpose.code());
        }
    }
}
