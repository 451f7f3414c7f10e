//! Entities

pub mod audit_log;
