//! HTTP Handlers
//!
//! Reads of the catalog and of active providers are public. Everything else
//! needs the `x-user-*` headers set by the auth middleware.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use kernel::error::app_error::AppError;
use platform::actor::ActorContext;
use platform::audit_events::{AuditEmitter, AuditEvent};
use platform::client::ClientInfo;
use platform::validation::{ValidatedJson, validation_error};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::application::{
    AppointmentUseCase, BookingInput, CatalogUseCase, ProviderConfig, ProviderProfileUseCase,
};
use crate::domain::repository::ProviderStore;
use crate::domain::value_object::AppointmentAction;
use crate::error::ProviderResult;
use crate::presentation::dto::{
    AppointmentResponse, AppointmentsResponse, BookAppointmentRequest, CategoriesResponse,
    CategoryResponse, CreateCategoryRequest, CreateServiceAreaRequest, ListAppointmentsQuery,
    ListProvidersQuery, ProviderRequest, ProviderResponse, ProviderStatusRequest,
    ProvidersResponse, ServiceAreaResponse, ServiceAreasResponse,
};

const AUDIT_SOURCE: &str = "provider";

#[derive(Clone)]
pub struct ProviderAppState<R>
where
    R: ProviderStore,
{
    pub repo: Arc<R>,
    pub config: Arc<ProviderConfig>,
    pub audit: AuditEmitter,
}

impl<R: ProviderStore> ProviderAppState<R> {
    fn profiles(&self) -> ProviderProfileUseCase<R> {
        ProviderProfileUseCase::new(self.repo.clone())
    }

    fn appointments(&self) -> AppointmentUseCase<R> {
        AppointmentUseCase::new(self.repo.clone(), self.config.clone())
    }
}

fn event(name: &str, actor: &ActorContext, target: String, client: &ClientInfo) -> AuditEvent {
    AuditEvent::new(AUDIT_SOURCE, name)
        .actor(actor.user_id.as_str(), actor.role)
        .target(target)
        .ip(client.ip_string())
}

// ===== Catalog =====

/// GET /api/categories
pub async fn list_categories<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
) -> ProviderResult<Json<CategoriesResponse>> {
    let categories = CatalogUseCase::new(state.repo.clone()).categories().await?;
    Ok(Json(CategoriesResponse {
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
    }))
}

/// POST /api/categories
pub async fn create_category<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> ProviderResult<(StatusCode, Json<CategoryResponse>)> {
    let category = CatalogUseCase::new(state.repo.clone())
        .create_category(&actor, &req.name, req.description)
        .await?;

    state.audit.emit(
        event("category.created", &actor, category.id.to_string(), &client)
            .metadata(json!({ "name": category.name })),
    );
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// GET /api/service-areas
pub async fn list_service_areas<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
) -> ProviderResult<Json<ServiceAreasResponse>> {
    let areas = CatalogUseCase::new(state.repo.clone()).service_areas().await?;
    Ok(Json(ServiceAreasResponse {
        service_areas: areas.into_iter().map(ServiceAreaResponse::from).collect(),
    }))
}

/// POST /api/service-areas
pub async fn create_service_area<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<CreateServiceAreaRequest>,
) -> ProviderResult<(StatusCode, Json<ServiceAreaResponse>)> {
    let area = CatalogUseCase::new(state.repo.clone())
        .create_service_area(&actor, &req.name, req.municipality)
        .await?;

    state.audit.emit(
        event("service_area.created", &actor, area.id.to_string(), &client)
            .metadata(json!({ "name": area.name, "municipality": area.municipality })),
    );
    Ok((StatusCode::CREATED, Json(area.into())))
}

// ===== Providers =====

/// GET /api/providers
pub async fn list_providers<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    Query(query): Query<ListProvidersQuery>,
) -> ProviderResult<Json<ProvidersResponse>> {
    query.validate().map_err(validation_error)?;

    let providers = state
        .profiles()
        .search(query.category_id, query.area_id, state.config.page_size(query.limit))
        .await?;
    Ok(Json(ProvidersResponse {
        providers: providers.into_iter().map(ProviderResponse::from).collect(),
    }))
}

/// GET /api/providers/{id}
pub async fn get_provider<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProviderResult<Json<ProviderResponse>> {
    let viewer = ActorContext::from_headers(&headers).ok();
    let provider = state.profiles().get(&id, viewer.as_ref()).await?;
    Ok(Json(provider.into()))
}

/// POST /api/providers
pub async fn register_provider<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<ProviderRequest>,
) -> ProviderResult<(StatusCode, Json<ProviderResponse>)> {
    let provider = state.profiles().register(&actor, req.into()).await?;

    state.audit.emit(
        event("provider.registered", &actor, provider.id.to_string(), &client)
            .metadata(json!({ "businessName": provider.profile.business_name })),
    );
    Ok((StatusCode::CREATED, Json(provider.into())))
}

/// GET /api/providers/me
pub async fn my_provider<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
) -> ProviderResult<Json<ProviderResponse>> {
    let provider = state.profiles().mine(&actor).await?;
    Ok(Json(provider.into()))
}

/// PUT /api/providers/me
pub async fn update_my_provider<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<ProviderRequest>,
) -> ProviderResult<Json<ProviderResponse>> {
    let provider = state.profiles().update_mine(&actor, req.into()).await?;

    state.audit.emit(event(
        "provider.updated",
        &actor,
        provider.id.to_string(),
        &client,
    ));
    Ok(Json(provider.into()))
}

/// POST /api/providers/{id}/status
pub async fn set_provider_status<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ProviderStatusRequest>,
) -> ProviderResult<Json<ProviderResponse>> {
    let provider = state.profiles().set_status(&actor, &id, req.status).await?;

    state.audit.emit(
        event("provider.status_changed", &actor, provider.id.to_string(), &client)
            .metadata(json!({ "status": provider.status.code(), "ownerId": provider.owner_id })),
    );
    Ok(Json(provider.into()))
}

// ===== Appointments =====

/// POST /api/appointments
pub async fn book_appointment<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<BookAppointmentRequest>,
) -> ProviderResult<(StatusCode, Json<AppointmentResponse>)> {
    let input = BookingInput {
        provider_id: req.provider_id,
        scheduled_at: req.scheduled_at,
        duration_minutes: req.duration_minutes,
        notes: req.notes,
    };
    let appointment = state.appointments().book(&actor, input, Utc::now()).await?;

    state.audit.emit(
        event("appointment.requested", &actor, appointment.id.to_string(), &client).metadata(
            json!({
                "providerId": appointment.provider_id.to_string(),
                "scheduledAt": appointment.scheduled_at,
                "durationMinutes": appointment.duration_minutes,
            }),
        ),
    );
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// GET /api/appointments/mine
pub async fn my_appointments<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    Query(query): Query<ListAppointmentsQuery>,
) -> ProviderResult<Json<AppointmentsResponse>> {
    query.validate().map_err(validation_error)?;

    let appointments = state
        .appointments()
        .mine(&actor, state.config.page_size(query.limit))
        .await?;
    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(AppointmentResponse::from).collect(),
    }))
}

/// POST /api/appointments/{id}/{confirm|decline|complete|cancel}
pub async fn appointment_action<R: ProviderStore>(
    State(state): State<ProviderAppState<R>>,
    actor: ActorContext,
    client: ClientInfo,
    Path((id, action)): Path<(String, String)>,
) -> ProviderResult<Json<AppointmentResponse>> {
    let action = AppointmentAction::from_code(&action)
        .ok_or_else(|| AppError::not_found(format!("Unknown appointment action: {action}")))?;
    let appointment = state.appointments().act(&actor, &id, action, Utc::now()).await?;

    state.audit.emit(
        event(
            &format!("appointment.{}", appointment.status),
            &actor,
            appointment.id.to_string(),
            &client,
        )
        .metadata(json!({ "providerId": appointment.provider_id.to_string() })),
    );
    Ok(Json(appointment.into()))
}
