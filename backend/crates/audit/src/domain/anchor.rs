//! Ledger anchoring seam

use crate::domain::value_object::content_hash::ContentHash;
use crate::error::AuditResult;

/// Writes a content hash to an external ledger
#[trait_variant::make(Anchor: Send)]
pub trait LocalAnchor {
    /// Submit `hash` tagged with `source`; returns the transaction hash
    async fn anchor(&self, hash: &ContentHash, source: &str) -> AuditResult<String>;
}

/// Anchor shared by the audit handlers and background tasks
pub trait AnchorClient: Anchor + Send + Sync + 'static {}

impl<T> AnchorClient for T where T: Anchor + Send + Sync + 'static {}
