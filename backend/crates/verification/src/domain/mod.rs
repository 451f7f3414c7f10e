//! Domain Layer

pub mod entity;
pub mod repository;

pub use entity::id_verification::{IdVerification, VerificationStatus};
pub use repository::{VerificationRepository, VerificationStore};
