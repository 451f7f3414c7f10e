//! Application Configuration

use std::time::Duration;

use platform::cookie::SessionCookie;
use platform::env::Environment;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    pub session_cookie: SessionCookie,
    /// HMAC key for session tokens
    pub session_secret: [u8; 32],
    /// Without "Remember Me"
    pub session_ttl_short: Duration,
    /// With "Remember Me"
    pub session_ttl_long: Duration,
    /// Application-wide password pepper
    pub password_pepper: Option<Vec<u8>>,
    /// Frontend base URL used in emailed links
    pub app_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            session_cookie: SessionCookie::for_environment(Environment::Production),
            session_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600),
            session_ttl_long: Duration::from_secs(7 * 24 * 3600),
            password_pepper: None,
            app_base_url: "http://localhost:5173".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Random secret, insecure cookie
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            session_cookie: SessionCookie::for_environment(Environment::Development),
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl(&self, remember_me: bool) -> chrono::Duration {
        let ttl = if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        };
        chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(12))
    }

    /// Cookie Max-Age: long sessions persist, short ones end with the browser
    pub fn cookie_max_age(&self, remember_me: bool) -> Option<i64> {
        remember_me.then(|| self.session_ttl_long.as_secs() as i64)
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn link(&self, path: &str, token: &str) -> String {
        format!(
            "{}/{}?token={}",
            self.app_base_url.trim_end_matches('/'),
            path.trim_start_matches('/'),
            token
        )
    }
}
