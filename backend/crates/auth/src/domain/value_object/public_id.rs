//! Public user identifier
//!
//! Nanoid exposed to clients and to other services (`x-user-id`); the UUID
//! primary key stays inside the auth service.
//!
//! ```rust
//! use auth::domain::value_object::public_id::PublicId;
//!
//! let id = PublicId::new();
//! assert_eq!(id.as_str().len(), 21);
//! assert_eq!(id.as_str().parse::<PublicId>().unwrap(), id);
//! ```

use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use nid::Nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Nanoid);

impl PublicId {
    #[inline]
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PublicId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Nanoid::from_str(s.trim())
            .map(PublicId)
            .map_err(|e| AppError::bad_request("Invalid public id").with_source(e))
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_and_invalid() {
        let id: PublicId = "0123456789abcdefghi01".parse().unwrap();
        assert_eq!(id.to_string(), "0123456789abcdefghi01");
        assert_eq!("bad id!".parse::<PublicId>().unwrap_err().status_code(), 400);
    }
}
