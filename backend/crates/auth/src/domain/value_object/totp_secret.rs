//! TOTP Secret Value Object
//!
//! RFC 6238, SHA-1, six digits, 30 second step, one step of skew. Matches
//! Google Authenticator and most authenticator apps.

use kernel::error::app_error::{AppError, AppResult};
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
const TOTP_SKEW: u8 = 1;
const TOTP_ISSUER: &str = "PermitHub";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpSecret {
    secret_base32: String,
}

impl TotpSecret {
    pub fn generate() -> Self {
        Self {
            secret_base32: Secret::generate_secret().to_encoded().to_string(),
        }
    }

    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_base32 = secret.into();
        Secret::Encoded(secret_base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {e}")))?;
        Ok(Self { secret_base32 })
    }

    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn totp(&self, account_name: &str) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(self.secret_base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {e}")))?;

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            bytes,
            Some(TOTP_ISSUER.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to build TOTP: {e}")))
    }

    pub fn verify(&self, code: &str, account_name: &str) -> AppResult<bool> {
        let code = code.trim();
        if code.len() != TOTP_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }
        Ok(self.totp(account_name)?.check_current(code).unwrap_or(false))
    }

    #[cfg(test)]
    pub fn current_code(&self, account_name: &str) -> String {
        self.totp(account_name)
            .and_then(|t| {
                t.generate_current()
                    .map_err(|e| AppError::internal(e.to_string()))
            })
            .unwrap()
    }

    /// Base64 PNG of the provisioning QR code
    pub fn qr_code_base64(&self, account_name: &str) -> AppResult<String> {
        self.totp(account_name)?
            .get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to render QR code: {e}")))
    }

    pub fn otpauth_url(&self, account_name: &str) -> AppResult<String> {
        Ok(self.totp(account_name)?.get_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "staff@lgu.example.ph";

    #[test]
    fn test_current_code_verifies() {
        let secret = TotpSecret::generate();
        let code = secret.current_code(ACCOUNT);
        assert!(secret.verify(&code, ACCOUNT).unwrap());
        assert!(!secret.verify("12ab56", ACCOUNT).unwrap());
        assert!(!secret.verify("1234567", ACCOUNT).unwrap());
    }

    #[test]
    fn test_round_trip_base32() {
        let secret = TotpSecret::generate();
        let restored = TotpSecret::from_base32(secret.as_base32()).unwrap();
        assert_eq!(secret, restored);
        assert!(TotpSecret::from_base32("not base32 !!").is_err());
    }

    #[test]
    fn test_provisioning_material() {
        let secret = TotpSecret::generate();
        assert!(secret
            .otpauth_url(ACCOUNT)
            .unwrap()
            .starts_with("otpauth://totp/PermitHub"));
        assert!(!secret.qr_code_base64(ACCOUNT).unwrap().is_empty());
    }
}
