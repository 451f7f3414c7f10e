//! Provider listing status

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Registered, waiting for LGU staff
    #[display("pending_approval")]
    PendingApproval,
    #[display("active")]
    Active,
    #[display("suspended")]
    Suspended,
}

impl ProviderStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ProviderStatus::PendingApproval => "pending_approval",
            ProviderStatus::Active => "active",
            ProviderStatus::Suspended => "suspended",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending_approval" => Some(ProviderStatus::PendingApproval),
            "active" => Some(ProviderStatus::Active),
            "suspended" => Some(ProviderStatus::Suspended),
            _ => None,
        }
    }

    /// Approval is one-way; staff may suspend and reinstate afterwards
    pub fn can_transition_to(self, next: ProviderStatus) -> bool {
        use ProviderStatus::*;
        matches!(
            (self, next),
            (PendingApproval, Active) | (PendingApproval, Suspended) | (Active, Suspended) | (Suspended, Active)
        )
    }
}
