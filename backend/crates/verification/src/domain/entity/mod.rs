//! Entities

pub mod id_verification;
