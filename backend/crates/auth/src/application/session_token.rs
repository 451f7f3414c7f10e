//! Session cookie token: `<session uuid>.<base64url HMAC-SHA256(uuid)>`

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8; 32], session_id: &str) -> AuthResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::Internal(format!("Invalid session secret: {e}")))?;
    mac.update(session_id.as_bytes());
    Ok(mac)
}

pub fn sign(secret: &[u8; 32], session_id: Uuid) -> AuthResult<String> {
    let id = session_id.to_string();
    let signature = mac(secret, &id)?.finalize().into_bytes();
    Ok(format!("{}.{}", id, URL_SAFE_NO_PAD.encode(signature)))
}

/// Session id of a correctly signed token
pub fn verify(secret: &[u8; 32], token: &str) -> AuthResult<Uuid> {
    let (id, signature) = token.split_once('.').ok_or(AuthError::SessionInvalid)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    mac(secret, id)?
        .verify_slice(&signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    id.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let secret = [7u8; 32];
        let id = Uuid::new_v4();
        let token = sign(&secret, id).unwrap();
        assert_eq!(verify(&secret, &token).unwrap(), id);
    }

    #[test]
    fn test_tampering_is_rejected() {
        let secret = [7u8; 32];
        let token = sign(&secret, Uuid::new_v4()).unwrap();

        assert!(verify(&[8u8; 32], &token).is_err());

        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), sig);
        assert!(verify(&secret, &forged).is_err());

        assert!(verify(&secret, "no-dot").is_err());
        assert!(verify(&secret, "abc.!!!").is_err());
    }
}
