//! Infrastructure Layer

pub mod eth_anchor;
#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use eth_anchor::EthJsonRpcAnchor;
pub use postgres::PgAuditRepository;
