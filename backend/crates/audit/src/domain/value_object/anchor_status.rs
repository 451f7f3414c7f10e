//! Anchor Status

use derive_more::Display;

/// Where a log's content hash stands with the ledger.
///
/// `Disabled` logs were written while no ledger was configured and are never
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AnchorStatus {
    #[display("disabled")]
    Disabled,
    #[display("pending")]
    Pending,
    #[display("anchored")]
    Anchored,
    #[display("failed")]
    Failed,
}

impl AnchorStatus {
    pub fn code(&self) -> &'static str {
        match self {
            AnchorStatus::Disabled => "disabled",
            AnchorStatus::Pending => "pending",
            AnchorStatus::Anchored => "anchored",
            AnchorStatus::Failed => "failed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "disabled" => Some(AnchorStatus::Disabled),
            "pending" => Some(AnchorStatus::Pending),
            "anchored" => Some(AnchorStatus::Anchored),
            "failed" => Some(AnchorStatus::Failed),
            _ => None,
        }
    }
}
