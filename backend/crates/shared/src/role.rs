//! Platform user roles
//!
//! The same four roles are understood by every service: the auth service
//! stores them, the gateway forwards them in `x-user-role`, and the
//! business services authorize on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    /// Applicant / member of the public
    #[default]
    Customer = 0,
    /// Registered business or service provider
    Provider = 1,
    /// Local-government-unit staff reviewing registrations
    LguStaff = 2,
    Admin = 3,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Customer,
        UserRole::Provider,
        UserRole::LguStaff,
        UserRole::Admin,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Provider => "provider",
            UserRole::LguStaff => "lgu_staff",
            UserRole::Admin => "admin",
        }
    }

    /// Roles anyone may pick at sign up
    #[inline]
    pub const fn is_self_service(&self) -> bool {
        matches!(self, UserRole::Customer | UserRole::Provider)
    }

    /// Staff roles; these must use a second factor
    #[inline]
    pub const fn is_staff(&self) -> bool {
        matches!(self, UserRole::LguStaff | UserRole::Admin)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
            assert_eq!(UserRole::from_id(role.id()), Some(role));
        }
        assert_eq!(UserRole::from_id(42), None);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_checks() {
        assert!(UserRole::Customer.is_self_service());
        assert!(UserRole::Provider.is_self_service());
        assert!(!UserRole::LguStaff.is_self_service());
        assert!(!UserRole::Admin.is_self_service());

        assert!(UserRole::LguStaff.is_staff());
        assert!(UserRole::Admin.is_staff());
        assert!(!UserRole::Provider.is_staff());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&UserRole::LguStaff).unwrap();
        assert_eq!(json, "\"lgu_staff\"");
    }
}
