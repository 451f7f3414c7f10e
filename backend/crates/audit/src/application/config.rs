//! Application Configuration

use std::time::Duration;

/// Ledger endpoint for anchoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    /// Deployed contract exposing `anchor(bytes32,string)`
    pub contract_address: String,
    /// Sending account; the node's first unlocked account when unset
    pub from_address: Option<String>,
}

impl AnchorConfig {
    /// Both the contract and the node are required to anchor
    pub fn from_parts(
        contract_address: Option<String>,
        rpc_url: Option<String>,
        from_address: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            rpc_url: rpc_url?,
            contract_address: contract_address?,
            from_address,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub anchor: Option<AnchorConfig>,
    /// Logs per backlog pass
    pub backlog_batch: i64,
    /// Pending logs younger than this still have their own anchor task running
    pub backlog_grace: Duration,
    /// Upper bound for `limit` on listings
    pub max_page_size: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            anchor: None,
            backlog_batch: 50,
            backlog_grace: Duration::from_secs(60),
            max_page_size: 200,
        }
    }
}

impl AuditConfig {
    /// No ledger; every log is `disabled`
    pub fn development() -> Self {
        Self::default()
    }

    pub fn anchoring_enabled(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn backlog_grace(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.backlog_grace).unwrap_or(chrono::Duration::minutes(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_needs_contract_and_node() {
        assert!(AnchorConfig::from_parts(Some("0x1".into()), None, None).is_none());
        assert!(AnchorConfig::from_parts(None, Some("http://node".into()), None).is_none());

        let config =
            AnchorConfig::from_parts(Some("0x1".into()), Some("http://node".into()), None).unwrap();
        assert_eq!(config.rpc_url, "http://node");
        assert_eq!(config.from_address, None);
    }
}
