//! Cryptographic Utilities
//!
//! Random secrets, SHA-256 digests and constant-time comparison. One-time
//! secrets (MFA bootstrap tokens, reset links, deletion codes) are only ever
//! persisted as [`hash_secret`] digests.

use base64::{Engine, engine::general_purpose};
use rand::{Rng, RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random URL-safe token carrying `entropy_bytes` bytes of entropy
pub fn random_token(entropy_bytes: usize) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes(entropy_bytes))
}

/// Random decimal code with exactly `digits` digits (leading zeros kept)
pub fn random_numeric_code(digits: u32) -> String {
    let upper = 10u64.pow(digits);
    let value = OsRng.gen_range(0..upper);
    format!("{:0width$}", value, width = digits as usize)
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Digest under which a one-time secret is stored and looked up
pub fn hash_secret(secret: &str) -> Vec<u8> {
    sha256(secret.trim().as_bytes()).to_vec()
}

/// Compute HMAC-SHA256 with a 32-byte key
pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    // H((K ^ opad) || H((K ^ ipad) || message)), key zero-padded to the block size
    let mut o_key_pad = [0x5cu8; 64];
    let mut i_key_pad = [0x36u8; 64];

    for (i, byte) in key.iter().enumerate() {
        o_key_pad[i] ^= byte;
        i_key_pad[i] ^= byte;
    }

    let mut inner = Sha256::new();
    inner.update(i_key_pad);
    inner.update(data);
    let inner_digest = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(o_key_pad);
    outer.update(inner_digest);
    outer.finalize().into()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
