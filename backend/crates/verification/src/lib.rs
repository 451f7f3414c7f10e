//! Identity Verification Backend Module
//!
//! Users upload identity document metadata (image URLs, document type) for
//! review by LGU staff.
//!
//! - One pending or verified record per user
//! - The uploader may withdraw a pending upload for 24 hours
//! - Reviewers decide once; a rejection carries a reason
//! - The sweeper expires uploads nobody reviewed within 30 days

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::{VerificationConfig, expire_stale};
pub use domain::{VerificationRepository, VerificationStore};
pub use error::{VerificationError, VerificationResult};
pub use infra::PgVerificationRepository;
pub use presentation::{VerificationAppState, verification_router, verification_routes};
