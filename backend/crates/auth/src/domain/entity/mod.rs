//! Entities

pub mod action_token;
pub mod auth;
pub mod auth_session;
pub mod delete_request;
pub mod mfa_bootstrap_token;
pub mod user;
