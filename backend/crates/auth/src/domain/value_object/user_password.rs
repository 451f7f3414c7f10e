//! User Password Value Object
//!
//! Domain wrapper over `platform::password` that turns policy and hashing
//! failures into user-facing [`AppError`]s.

use std::fmt;

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};

/// Password exactly as typed by the user, policy-checked
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw).map(Self).map_err(policy_error)
    }

    fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match err {
        PasswordPolicyError::TooShort { .. } => "Choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Choose a shorter password",
        PasswordPolicyError::EmptyOrWhitespace => "Enter a password",
        PasswordPolicyError::InvalidCharacter => "Remove control characters from the password",
        PasswordPolicyError::CommonPattern => "Choose a less predictable password",
    };
    AppError::bad_request(err.to_string()).with_action(action)
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Stored Argon2id hash
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([HASH])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_are_bad_requests_with_action() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.action(), Some("Choose a longer password"));

        let err = RawPassword::new("password123".to_string()).unwrap_err();
        assert_eq!(err.action(), Some("Choose a less predictable password"));
    }

    #[test]
    fn test_hash_verify_and_reload() {
        let raw = RawPassword::new("Permit-Office-2024".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(b"pep")).unwrap();
        assert!(hashed.verify(&raw, Some(b"pep")));

        let reloaded = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(reloaded.verify(&raw, Some(b"pep")));

        let wrong = RawPassword::new("Permit-Office-2025".to_string()).unwrap();
        assert!(!reloaded.verify(&wrong, Some(b"pep")));
    }

    #[test]
    fn test_corrupt_hash_is_internal() {
        let err = UserPassword::from_phc_string("plaintext").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
