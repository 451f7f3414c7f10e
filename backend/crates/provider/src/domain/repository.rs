//! Repository Traits

use chrono::{DateTime, Utc};
use kernel::id::{AppointmentId, CategoryId, ProviderId, ServiceAreaId};

use crate::domain::entity::appointment::Appointment;
use crate::domain::entity::catalog::{Category, ServiceArea};
use crate::domain::entity::provider::Provider;
use crate::domain::value_object::provider_status::ProviderStatus;
use crate::error::ProviderResult;

#[derive(Debug, Clone)]
pub struct ProviderFilter {
    pub category_id: Option<CategoryId>,
    pub area_id: Option<ServiceAreaId>,
    pub status: ProviderStatus,
    pub limit: i64,
}

/// Appointments where the user is the customer, or of the provider they own
#[derive(Debug, Clone)]
pub enum AppointmentParty {
    Customer(String),
    Provider(ProviderId),
}

#[trait_variant::make(ProviderRepository: Send)]
pub trait LocalProviderRepository {
    // ===== Catalog =====

    /// Fails with `DuplicateName` on a name clash (case-insensitive)
    async fn insert_category(&self, category: &Category) -> ProviderResult<()>;

    async fn list_categories(&self) -> ProviderResult<Vec<Category>>;

    async fn category_exists(&self, id: &CategoryId) -> ProviderResult<bool>;

    async fn insert_service_area(&self, area: &ServiceArea) -> ProviderResult<()>;

    async fn list_service_areas(&self) -> ProviderResult<Vec<ServiceArea>>;

    /// How many of `ids` exist
    async fn count_service_areas(&self, ids: &[ServiceAreaId]) -> ProviderResult<usize>;

    // ===== Providers =====

    /// Fails with `ProfileExists` when the owner already has one
    async fn insert_provider(&self, provider: &Provider) -> ProviderResult<()>;

    async fn find_provider(&self, id: &ProviderId) -> ProviderResult<Option<Provider>>;

    async fn find_provider_by_owner(&self, owner_id: &str) -> ProviderResult<Option<Provider>>;

    /// Ordered by business name
    async fn list_providers(&self, filter: &ProviderFilter) -> ProviderResult<Vec<Provider>>;

    /// Profile, service areas and status
    async fn update_provider(&self, provider: &Provider) -> ProviderResult<()>;

    // ===== Appointments =====

    async fn insert_appointment(&self, appointment: &Appointment) -> ProviderResult<()>;

    async fn find_appointment(&self, id: &AppointmentId) -> ProviderResult<Option<Appointment>>;

    /// Soonest first
    async fn list_appointments(
        &self,
        party: &AppointmentParty,
        limit: i64,
    ) -> ProviderResult<Vec<Appointment>>;

    /// Whether a confirmed appointment of `provider_id` other than `exclude`
    /// intersects `[start, end)`
    async fn has_confirmed_overlap(
        &self,
        provider_id: &ProviderId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&AppointmentId>,
    ) -> ProviderResult<bool>;

    /// Status only; fails with `SlotTaken` when a confirmation races another
    async fn update_appointment(&self, appointment: &Appointment) -> ProviderResult<()>;
}

pub trait ProviderStore: ProviderRepository + Clone + Send + Sync + 'static {}

impl<T> ProviderStore for T where T: ProviderRepository + Clone + Send + Sync + 'static {}
