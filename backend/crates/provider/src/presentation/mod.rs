//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ProviderAppState;
pub use router::{provider_router, provider_routes};
