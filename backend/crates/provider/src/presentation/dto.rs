//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ProviderId, ServiceAreaId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entity::appointment::Appointment;
use crate::domain::entity::catalog::{Category, ServiceArea};
use crate::domain::entity::provider::{Provider, ProviderProfile};
use crate::domain::value_object::{AppointmentStatus, ProviderStatus};

// ===== Requests =====

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAreaRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(max = 80))]
    pub municipality: Option<String>,
}

/// Body of both `POST /providers` and `PUT /providers/me`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    #[validate(length(min = 1, max = 120))]
    pub business_name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 service areas"))]
    pub service_area_ids: Vec<ServiceAreaId>,
    #[validate(length(max = 30))]
    pub contact_phone: Option<String>,
}

impl From<ProviderRequest> for ProviderProfile {
    fn from(req: ProviderRequest) -> Self {
        Self {
            business_name: req.business_name,
            description: req.description,
            category_id: req.category_id,
            service_area_ids: req.service_area_ids,
            contact_phone: req.contact_phone,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProviderStatusRequest {
    pub status: ProviderStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListProvidersQuery {
    pub category_id: Option<CategoryId>,
    pub area_id: Option<ServiceAreaId>,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200"))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub provider_id: ProviderId,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListAppointmentsQuery {
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200"))]
    pub limit: Option<i64>,
}

// ===== Responses =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAreaResponse {
    pub id: ServiceAreaId,
    pub name: String,
    pub municipality: Option<String>,
}

impl From<ServiceArea> for ServiceAreaResponse {
    fn from(a: ServiceArea) -> Self {
        Self {
            id: a.id,
            name: a.name,
            municipality: a.municipality,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: ProviderId,
    pub owner_id: String,
    pub business_name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub service_area_ids: Vec<ServiceAreaId>,
    pub contact_phone: Option<String>,
    pub status: ProviderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Provider> for ProviderResponse {
    fn from(p: Provider) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            business_name: p.profile.business_name,
            description: p.profile.description,
            category_id: p.profile.category_id,
            service_area_ids: p.profile.service_area_ids,
            contact_phone: p.profile.contact_phone,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: String,
    pub provider_id: ProviderId,
    pub customer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id.to_string(),
            ends_at: a.ends_at(),
            provider_id: a.provider_id,
            customer_id: a.customer_id,
            scheduled_at: a.scheduled_at,
            duration_minutes: a.duration_minutes,
            notes: a.notes,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAreasResponse {
    pub service_areas: Vec<ServiceAreaResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentResponse>,
}
