//! Application Layer

pub mod config;
pub mod expiry;
pub mod review;
pub mod revert;
pub mod upload;

pub use config::VerificationConfig;
pub use expiry::expire_stale;
pub use review::ReviewVerificationUseCase;
pub use revert::MyVerificationUseCase;
pub use upload::{UploadInput, UploadVerificationUseCase};
