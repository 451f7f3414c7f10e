//! Value Objects

pub mod anchor_status;
pub mod content_hash;
