//! MFA Bootstrap Token
//!
//! One-time credential that lets a user who cannot pass the TOTP check yet
//! (new staff account, lost authenticator) enrol a fresh secret. Only the
//! SHA-256 of the secret is stored.

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use platform::crypto::{hash_secret, random_token};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// How the token reached the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BootstrapChannel {
    /// Self-service, mailed to the account address
    #[display("email")]
    Email,
    /// Issued by an administrator and handed over out of band
    #[display("admin")]
    Admin,
}

impl BootstrapChannel {
    pub fn ttl(&self) -> Duration {
        match self {
            Self::Email => Duration::minutes(15),
            Self::Admin => Duration::hours(24),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "email" => Some(Self::Email),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MfaBootstrapToken {
    pub token_id: Uuid,
    pub user_id: UserId,
    pub secret_hash: Vec<u8>,
    pub channel: BootstrapChannel,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MfaBootstrapToken {
    /// Minimum spacing between self-service requests
    pub const REQUEST_COOLDOWN_SECS: i64 = 60;
    const SECRET_BYTES: usize = 32;

    /// New token and its clear-text secret (shown or mailed once)
    pub fn issue(user_id: UserId, channel: BootstrapChannel, now: DateTime<Utc>) -> (Self, String) {
        let secret = random_token(Self::SECRET_BYTES);
        let token = Self {
            token_id: Uuid::new_v4(),
            user_id,
            secret_hash: hash_secret(&secret),
            channel,
            expires_at: now + channel.ttl(),
            used_at: None,
            created_at: now,
        };
        (token, secret)
    }

    /// Unused and not yet expired
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Still inside the cooldown of a previous request
    pub fn blocks_new_request_at(&self, now: DateTime<Utc>) -> bool {
        now < self.created_at + Duration::seconds(Self::REQUEST_COOLDOWN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_usable_gates_on_expiry_and_use() {
        let now = Utc::now();
        let (mut token, secret) = MfaBootstrapToken::issue(UserId::new(), BootstrapChannel::Email, now);

        assert_eq!(token.secret_hash, hash_secret(&secret));
        assert!(token.is_usable_at(now));
        assert!(token.is_usable_at(now + Duration::minutes(14)));
        assert!(!token.is_usable_at(now + Duration::minutes(15)));

        token.used_at = Some(now);
        assert!(!token.is_usable_at(now));
    }

    #[test]
    fn test_admin_tokens_last_a_day() {
        let now = Utc::now();
        let (token, _) = MfaBootstrapToken::issue(UserId::new(), BootstrapChannel::Admin, now);
        assert!(token.is_usable_at(now + Duration::hours(23)));
        assert_eq!(token.channel.to_string(), "admin");
    }

    #[test]
    fn test_cooldown() {
        let now = Utc::now();
        let (token, _) = MfaBootstrapToken::issue(UserId::new(), BootstrapChannel::Email, now);
        assert!(token.blocks_new_request_at(now + Duration::seconds(59)));
        assert!(!token.blocks_new_request_at(now + Duration::seconds(60)));
    }
}
