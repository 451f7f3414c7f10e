//! Email Value Object
//!
//! Lowercased, trimmed, syntactically plausible address. Ownership is proven
//! separately through an emailed verification token.

use kernel::error::app_error::{AppError, AppResult, FieldViolation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RFC 5321 path limit
const EMAIL_MAX_LENGTH: usize = 254;
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> AppResult<Self> {
        let email = email.as_ref().trim().to_lowercase();

        let problem = if email.is_empty() {
            Some("must not be empty")
        } else if email.len() > EMAIL_MAX_LENGTH {
            Some("must be at most 254 characters")
        } else if !is_plausible(&email) {
            Some("must be a valid email address")
        } else {
            None
        };

        match problem {
            Some(message) => Err(AppError::bad_request("Invalid email address")
                .with_fields(vec![FieldViolation::new("email", message)])),
            None => Ok(Self(email)),
        }
    }

    /// Trusted value read back from the database
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `j***@example.com`, for logs
    pub fn masked(&self) -> String {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let first = local.chars().next().unwrap_or('*');
                format!("{first}***@{domain}")
            }
            None => "***".to_string(),
        }
    }
}

fn is_plausible(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH || local.contains(char::is_whitespace) {
        return false;
    }

    !domain.is_empty()
        && domain.contains('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-'])
        && !domain.contains("..")
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
