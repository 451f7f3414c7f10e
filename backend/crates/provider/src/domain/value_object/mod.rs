//! Value Objects

pub mod appointment_status;
pub mod provider_status;

pub use appointment_status::{AppointmentAction, AppointmentStatus};
pub use provider_status::ProviderStatus;
