//! In-memory provider store for tests

use chrono::{DateTime, Utc};
use kernel::id::{AppointmentId, CategoryId, ProviderId, ServiceAreaId};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entity::appointment::Appointment;
use crate::domain::entity::catalog::{Category, ServiceArea};
use crate::domain::entity::provider::Provider;
use crate::domain::repository::{AppointmentParty, ProviderFilter, ProviderRepository};
use crate::domain::value_object::AppointmentStatus;
use crate::error::{ProviderError, ProviderResult};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    areas: Vec<ServiceArea>,
    providers: Vec<Provider>,
    appointments: Vec<Appointment>,
}

#[derive(Clone, Default)]
pub struct MemoryProviderRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProviderRepository for MemoryProviderRepository {
    async fn insert_category(&self, category: &Category) -> ProviderResult<()> {
        let mut t = self.lock();
        if t.categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(ProviderError::DuplicateName("Category"));
        }
        t.categories.push(category.clone());
        Ok(())
    }

    async fn list_categories(&self) -> ProviderResult<Vec<Category>> {
        let mut rows = self.lock().categories.clone();
        rows.sort_by_key(|c| c.name.to_lowercase());
        Ok(rows)
    }

    async fn category_exists(&self, id: &CategoryId) -> ProviderResult<bool> {
        Ok(self.lock().categories.iter().any(|c| c.id == *id))
    }

    async fn insert_service_area(&self, area: &ServiceArea) -> ProviderResult<()> {
        let mut t = self.lock();
        let key = |a: &ServiceArea| {
            (
                a.name.to_lowercase(),
                a.municipality.as_deref().unwrap_or_default().to_lowercase(),
            )
        };
        if t.areas.iter().any(|a| key(a) == key(area)) {
            return Err(ProviderError::DuplicateName("Service area"));
        }
        t.areas.push(area.clone());
        Ok(())
    }

    async fn list_service_areas(&self) -> ProviderResult<Vec<ServiceArea>> {
        let mut rows = self.lock().areas.clone();
        rows.sort_by_key(|a| a.name.to_lowercase());
        Ok(rows)
    }

    async fn count_service_areas(&self, ids: &[ServiceAreaId]) -> ProviderResult<usize> {
        let t = self.lock();
        Ok(t.areas.iter().filter(|a| ids.contains(&a.id)).count())
    }

    async fn insert_provider(&self, provider: &Provider) -> ProviderResult<()> {
        let mut t = self.lock();
        if t.providers.iter().any(|p| p.owner_id == provider.owner_id) {
            return Err(ProviderError::ProfileExists);
        }
        t.providers.push(provider.clone());
        Ok(())
    }

    async fn find_provider(&self, id: &ProviderId) -> ProviderResult<Option<Provider>> {
        Ok(self.lock().providers.iter().find(|p| p.id == *id).cloned())
    }

    async fn find_provider_by_owner(&self, owner_id: &str) -> ProviderResult<Option<Provider>> {
        Ok(self
            .lock()
            .providers
            .iter()
            .find(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn list_providers(&self, filter: &ProviderFilter) -> ProviderResult<Vec<Provider>> {
        let mut rows: Vec<Provider> = self
            .lock()
            .providers
            .iter()
            .filter(|p| p.status == filter.status)
            .filter(|p| filter.category_id.is_none_or(|c| p.profile.category_id == c))
            .filter(|p| {
                filter
                    .area_id
                    .is_none_or(|a| p.profile.service_area_ids.contains(&a))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.profile.business_name.to_lowercase());
        rows.truncate(filter.limit.max(0) as usize);
        Ok(rows)
    }

    async fn update_provider(&self, provider: &Provider) -> ProviderResult<()> {
        if let Some(row) = self.lock().providers.iter_mut().find(|p| p.id == provider.id) {
            *row = provider.clone();
        }
        Ok(())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> ProviderResult<()> {
        self.lock().appointments.push(appointment.clone());
        Ok(())
    }

    async fn find_appointment(&self, id: &AppointmentId) -> ProviderResult<Option<Appointment>> {
        Ok(self.lock().appointments.iter().find(|a| a.id == *id).cloned())
    }

    async fn list_appointments(
        &self,
        party: &AppointmentParty,
        limit: i64,
    ) -> ProviderResult<Vec<Appointment>> {
        let mut rows: Vec<Appointment> = self
            .lock()
            .appointments
            .iter()
            .filter(|a| match party {
                AppointmentParty::Customer(customer_id) => a.customer_id == *customer_id,
                AppointmentParty::Provider(provider_id) => a.provider_id == *provider_id,
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.scheduled_at);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn has_confirmed_overlap(
        &self,
        provider_id: &ProviderId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&AppointmentId>,
    ) -> ProviderResult<bool> {
        Ok(self.lock().appointments.iter().any(|a| {
            a.provider_id == *provider_id
                && a.status == AppointmentStatus::Confirmed
                && exclude != Some(&a.id)
                && a.overlaps(start, end)
        }))
    }

    async fn update_appointment(&self, appointment: &Appointment) -> ProviderResult<()> {
        if let Some(row) = self
            .lock()
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment.id)
        {
            *row = appointment.clone();
        }
        Ok(())
    }
}
