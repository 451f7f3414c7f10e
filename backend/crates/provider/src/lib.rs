//! Provider Backend Module
//!
//! Directory of local service providers and their appointments.
//!
//! - Categories (admin) and service areas (admin, LGU staff) are reference
//!   data
//! - A provider account registers one profile; it is listed once staff
//!   approve it
//! - Customers request appointments; the provider confirms or declines and
//!   later completes them, and either party may cancel
//! - A provider never holds two confirmed appointments that overlap

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

mod tests;

pub use application::ProviderConfig;
pub use domain::{ProviderRepository, ProviderStore};
pub use error::{ProviderError, ProviderResult};
pub use infra::PgProviderRepository;
pub use presentation::{ProviderAppState, provider_router, provider_routes};
