//! Ethereum JSON-RPC anchor
//!
//! Calls `anchor(bytes32 hash, string source)` on the audit contract through
//! `eth_sendTransaction`. The node signs with an unlocked account, which is
//! how the local development chains are run.

use serde_json::{Value, json};
use sha3::{Digest, Keccak256};
use std::time::Duration;

use crate::application::config::AnchorConfig;
use crate::domain::anchor::Anchor;
use crate::domain::value_object::content_hash::ContentHash;
use crate::error::{AuditError, AuditResult};

pub const ANCHOR_SIGNATURE: &str = "anchor(bytes32,string)";

const WORD: usize = 32;

#[derive(Clone)]
pub struct EthJsonRpcAnchor {
    client: reqwest::Client,
    rpc_url: String,
    contract_address: String,
    from_address: Option<String>,
}

impl EthJsonRpcAnchor {
    pub fn new(config: &AnchorConfig) -> AuditResult<Self> {
        if !is_address(&config.contract_address) {
            return Err(AuditError::Internal(format!(
                "AUDIT_CONTRACT_ADDRESS is not an address: {}",
                config.contract_address
            )));
        }
        if let Some(from) = config.from_address.as_deref().filter(|from| !is_address(from)) {
            return Err(AuditError::Internal(format!(
                "ANCHOR_FROM_ADDRESS is not an address: {from}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuditError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            contract_address: config.contract_address.clone(),
            from_address: config.from_address.clone(),
        })
    }

    async fn call(&self, method: &str, params: Value) -> AuditResult<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AuditError::Anchor(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuditError::Anchor(format!(
                "{method} returned status {}",
                response.status()
            )));
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| AuditError::Anchor(e.to_string()))?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(AuditError::Anchor(format!("{method}: {message}")));
        }
        Ok(body["result"].take())
    }

    async fn sender(&self) -> AuditResult<String> {
        if let Some(from) = &self.from_address {
            return Ok(from.clone());
        }
        let accounts = self.call("eth_accounts", json!([])).await?;
        accounts
            .get(0)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuditError::Anchor("node has no unlocked account".to_string()))
    }
}

impl Anchor for EthJsonRpcAnchor {
    async fn anchor(&self, hash: &ContentHash, source: &str) -> AuditResult<String> {
        let from = self.sender().await?;
        let data = format!("0x{}", hex::encode(anchor_calldata(hash, source)));

        let result = self
            .call(
                "eth_sendTransaction",
                json!([{
                    "from": from,
                    "to": self.contract_address,
                    "data": data,
                }]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AuditError::Anchor("eth_sendTransaction returned no hash".to_string()))
    }
}

/// First four bytes of the Keccak-256 of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// ABI encoding of `anchor(bytes32, string)`: selector, the hash, the offset
/// of the string tail, then its length and right-padded bytes.
pub fn anchor_calldata(hash: &ContentHash, source: &str) -> Vec<u8> {
    let bytes = source.as_bytes();
    let padding = (WORD - bytes.len() % WORD) % WORD;

    let mut data = Vec::with_capacity(4 + 3 * WORD + bytes.len() + padding);
    data.extend_from_slice(&function_selector(ANCHOR_SIGNATURE));
    data.extend_from_slice(hash.as_bytes());
    data.extend_from_slice(&uint_word(2 * WORD as u64));
    data.extend_from_slice(&uint_word(bytes.len() as u64));
    data.extend_from_slice(bytes);
    data.resize(data.len() + padding, 0);
    data
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matches_known_vector() {
        assert_eq!(
            hex::encode(function_selector("transfer(address,uint256)")),
            "a9059cbb"
        );
    }

    #[test]
    fn test_calldata_layout() {
        let hash = ContentHash::from_bytes([0xab; 32]);
        let data = anchor_calldata(&hash, "auth");

        assert_eq!(data.len(), 4 + 4 * WORD);
        assert_eq!(&data[..4], &function_selector(ANCHOR_SIGNATURE));
        assert_eq!(&data[4..36], &[0xab; 32]);
        assert_eq!(data[36 + WORD - 1], 0x40);
        assert!(data[36..36 + WORD - 1].iter().all(|b| *b == 0));
        assert_eq!(data[68 + WORD - 1], 4);
        assert_eq!(&data[100..104], b"auth");
        assert!(data[104..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_calldata_padding_edges() {
        let hash = ContentHash::from_bytes([0; 32]);
        assert_eq!(anchor_calldata(&hash, "").len(), 4 + 3 * WORD);
        assert_eq!(anchor_calldata(&hash, &"a".repeat(32)).len(), 4 + 4 * WORD);
        assert_eq!(anchor_calldata(&hash, &"a".repeat(33)).len(), 4 + 5 * WORD);
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        let config = AnchorConfig {
            rpc_url: "http://127.0.0.1:8545".into(),
            contract_address: "0x1234".into(),
            from_address: None,
        };
        assert!(EthJsonRpcAnchor::new(&config).is_err());

        let config = AnchorConfig {
            contract_address: format!("0x{}", "a".repeat(40)),
            ..config
        };
        assert!(EthJsonRpcAnchor::new(&config).is_ok());
    }
}
