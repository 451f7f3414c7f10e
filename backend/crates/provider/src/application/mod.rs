//! Application Layer

pub mod booking;
pub mod catalog;
pub mod config;
pub mod profile;

pub use booking::{AppointmentUseCase, BookingInput};
pub use catalog::CatalogUseCase;
pub use config::ProviderConfig;
pub use profile::{MODERATOR_ROLES, ProviderProfileUseCase};
