//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::VerificationAppState;
pub use router::{verification_router, verification_routes};
