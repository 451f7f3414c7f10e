//! Session cookie handling
//!
//! One cookie carries the signed session token. Its `Secure` flag follows the
//! runtime environment; its lifetime follows the "remember me" choice made at
//! sign in.

use axum::http::{HeaderMap, header};

use crate::env::Environment;

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes shared by every `Set-Cookie` issued for the session
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl SessionCookie {
    pub const DEFAULT_NAME: &'static str = "permit_session";

    /// Secure in production, plain HTTP allowed elsewhere
    pub fn for_environment(env: Environment) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            secure: env.is_production(),
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }

    fn attributes(&self) -> String {
        let mut attrs = String::from("; HttpOnly");
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str("; SameSite=");
        attrs.push_str(self.same_site.as_str());
        attrs.push_str("; Path=");
        attrs.push_str(&self.path);
        attrs
    }

    /// `Set-Cookie` value; `max_age_secs = None` yields a browser-session cookie
    pub fn issue(&self, token: &str, max_age_secs: Option<i64>) -> String {
        let mut cookie = format!("{}={}{}", self.name, token, self.attributes());
        if let Some(max_age) = max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        cookie
    }

    /// `Set-Cookie` value that clears the session cookie
    pub fn clear(&self) -> String {
        format!("{}={}; Max-Age=0", self.name, self.attributes())
    }

    /// Session token presented by the client, if any
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.name)
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::for_environment(Environment::Production)
    }
}

/// Extract a cookie value from headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
