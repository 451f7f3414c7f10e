//! Auth Session Entity
//!
//! Server-side session referenced by the signed cookie token. Bound to the
//! user agent fingerprint it was created with.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub remember_me: bool,
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// Where the session is opened from
#[derive(Debug, Clone, Default)]
pub struct SessionClient {
    pub fingerprint_hash: Vec<u8>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl AuthSession {
    pub fn new(user_id: UserId, remember_me: bool, client: SessionClient, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            remember_me,
            client_fingerprint_hash: client.fingerprint_hash,
            client_ip: client.ip,
            user_agent: client.user_agent,
            expires_at: now + ttl,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Remember-me sessions slide forward once less than half of `ttl_long`
    /// remains. Returns whether anything changed.
    pub fn touch(&mut self, now: DateTime<Utc>, ttl_long: Duration) -> bool {
        self.last_activity_at = now;
        if self.remember_me && self.expires_at < now + ttl_long / 2 {
            self.expires_at = now + ttl_long;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let session = AuthSession::new(
            UserId::new(),
            false,
            SessionClient::default(),
            Duration::hours(12),
        );
        assert!(!session.is_expired_at(Utc::now()));
        assert!(session.is_expired_at(Utc::now() + Duration::hours(13)));
    }

    #[test]
    fn test_remember_me_slides() {
        let ttl_long = Duration::days(7);
        let mut session =
            AuthSession::new(UserId::new(), true, SessionClient::default(), ttl_long);

        assert!(!session.touch(Utc::now(), ttl_long));

        let later = Utc::now() + Duration::days(5);
        assert!(session.touch(later, ttl_long));
        assert_eq!(session.expires_at, later + ttl_long);
    }

    #[test]
    fn test_short_session_never_slides() {
        let mut session = AuthSession::new(
            UserId::new(),
            false,
            SessionClient::default(),
            Duration::hours(12),
        );
        let before = session.expires_at;
        assert!(!session.touch(Utc::now() + Duration::hours(11), Duration::days(7)));
        assert_eq!(session.expires_at, before);
    }
}
