//! User Status
//!
//! `Active` → `PendingDeletion` (user confirmed account deletion, grace
//! period running) → `Active` again on cancel, or purged once the scheduled
//! date passes. `Disabled` is set by administrators and blocks sign in.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserStatus {
    #[default]
    Active = 0,
    Disabled = 1,
    PendingDeletion = 2,
}

impl UserStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::PendingDeletion => "pending_deletion",
        }
    }

    /// Accounts awaiting deletion can still sign in to cancel it
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active | Self::PendingDeletion)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Disabled),
            2 => Some(Self::PendingDeletion),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
