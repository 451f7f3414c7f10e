//! Provider profiles and their approval

use chrono::Utc;
use kernel::error::app_error::AppError;
use kernel::id::{CategoryId, ProviderId, ServiceAreaId};
use kernel::role::UserRole;
use platform::actor::ActorContext;
use std::sync::Arc;

use crate::domain::entity::provider::{Provider, ProviderProfile};
use crate::domain::repository::{ProviderFilter, ProviderRepository};
use crate::domain::value_object::provider_status::ProviderStatus;
use crate::error::{ProviderError, ProviderResult};

pub const MODERATOR_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::LguStaff];

pub struct ProviderProfileUseCase<R>
where
    R: ProviderRepository,
{
    repo: Arc<R>,
}

impl<R> ProviderProfileUseCase<R>
where
    R: ProviderRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn register(
        &self,
        actor: &ActorContext,
        profile: ProviderProfile,
    ) -> ProviderResult<Provider> {
        actor.require_any_role(&[UserRole::Provider])?;
        self.check_references(&profile).await?;

        let provider = Provider::register(actor.user_id.clone(), profile, Utc::now());
        self.repo.insert_provider(&provider).await?;

        tracing::info!(
            provider_id = %provider.id,
            owner_id = %provider.owner_id,
            "Provider registered"
        );
        Ok(provider)
    }

    pub async fn mine(&self, actor: &ActorContext) -> ProviderResult<Provider> {
        actor.require_any_role(&[UserRole::Provider])?;
        self.repo
            .find_provider_by_owner(&actor.user_id)
            .await?
            .ok_or(ProviderError::ProviderNotFound)
    }

    pub async fn update_mine(
        &self,
        actor: &ActorContext,
        profile: ProviderProfile,
    ) -> ProviderResult<Provider> {
        let mut provider = self.mine(actor).await?;
        self.check_references(&profile).await?;

        provider.update_profile(profile, Utc::now());
        self.repo.update_provider(&provider).await?;

        tracing::info!(provider_id = %provider.id, "Provider profile updated");
        Ok(provider)
    }

    /// Providers that are not active are only visible to their owner and
    /// to moderators
    pub async fn get(&self, id: &str, viewer: Option<&ActorContext>) -> ProviderResult<Provider> {
        let id: ProviderId = id.parse().map_err(AppError::from)?;
        let provider = self
            .repo
            .find_provider(&id)
            .await?
            .ok_or(ProviderError::ProviderNotFound)?;

        let privileged = viewer.is_some_and(|v| {
            provider.is_owned_by(&v.user_id) || v.has_any_role(&MODERATOR_ROLES)
        });
        if provider.is_active() || privileged {
            Ok(provider)
        } else {
            Err(ProviderError::ProviderNotFound)
        }
    }

    /// Active providers only
    pub async fn search(
        &self,
        category_id: Option<CategoryId>,
        area_id: Option<ServiceAreaId>,
        limit: i64,
    ) -> ProviderResult<Vec<Provider>> {
        self.repo
            .list_providers(&ProviderFilter {
                category_id,
                area_id,
                status: ProviderStatus::Active,
                limit,
            })
            .await
    }

    pub async fn set_status(
        &self,
        actor: &ActorContext,
        id: &str,
        status: ProviderStatus,
    ) -> ProviderResult<Provider> {
        actor.require_any_role(&MODERATOR_ROLES)?;
        let id: ProviderId = id.parse().map_err(AppError::from)?;

        let mut provider = self
            .repo
            .find_provider(&id)
            .await?
            .ok_or(ProviderError::ProviderNotFound)?;
        let previous = provider.status;

        provider.set_status(status, Utc::now())?;
        self.repo.update_provider(&provider).await?;

        tracing::info!(
            provider_id = %provider.id,
            moderator_id = %actor.user_id,
            from = %previous,
            to = %provider.status,
            "Provider status changed"
        );
        Ok(provider)
    }

    async fn check_references(&self, profile: &ProviderProfile) -> ProviderResult<()> {
        if !self.repo.category_exists(&profile.category_id).await? {
            return Err(ProviderError::UnknownReference("categoryId"));
        }

        let mut areas = profile.service_area_ids.clone();
        areas.sort_by_key(|id| *id.as_uuid());
        areas.dedup();
        if self.repo.count_service_areas(&areas).await? != areas.len() {
            return Err(ProviderError::UnknownReference("serviceAreaIds"));
        }
        Ok(())
    }
}
