//! Client identification
//!
//! Address and user agent of the caller. Sessions are bound to a hash of the
//! user agent; the address is recorded in audit events.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};

use crate::crypto::sha256;

/// Who is on the other end of the request
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Self {
        Self {
            ip: extract_client_ip(headers, direct_ip),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    /// SHA-256 of the user agent; an absent agent hashes as the empty string
    pub fn fingerprint(&self) -> [u8; 32] {
        sha256(self.user_agent.as_deref().unwrap_or_default().as_bytes())
    }

    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Never rejects. `ConnectInfo` is read from the extensions when the server
/// was started with it, so routers also work under `oneshot` in tests.
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self::from_headers(&parts.headers, direct_ip))
    }
}

/// Client IP: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let parse = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    parse("x-forwarded-for")
        .or_else(|| parse("x-real-ip"))
        .or(direct_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fingerprint_follows_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        let a = ClientInfo::from_headers(&headers, None);

        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        let b = ClientInfo::from_headers(&headers, None);

        assert_eq!(a.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(ClientInfo::default().fingerprint(), sha256(b""));
    }

    #[test]
    fn test_extract_client_ip_precedence() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));

        headers.insert("x-real-ip", HeaderValue::from_static("10.1.1.1"));
        assert_eq!(
            extract_client_ip(&headers, Some(direct)),
            Some("10.1.1.1".parse().unwrap())
        );

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );
        assert_eq!(
            extract_client_ip(&headers, Some(direct)),
            Some("192.168.1.1".parse().unwrap())
        );
    }

    #[test]
    fn test_garbage_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(extract_client_ip(&headers, None), None);
    }
}
