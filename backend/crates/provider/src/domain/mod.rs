//! Domain Layer

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::appointment::Appointment;
pub use entity::catalog::{Category, ServiceArea};
pub use entity::provider::{Provider, ProviderProfile};
pub use repository::{AppointmentParty, ProviderFilter, ProviderRepository, ProviderStore};
pub use value_object::{AppointmentAction, AppointmentStatus, ProviderStatus};
