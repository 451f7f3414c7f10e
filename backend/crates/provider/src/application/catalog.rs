//! Categories and service areas

use chrono::Utc;
use kernel::role::UserRole;
use platform::actor::ActorContext;
use std::sync::Arc;

use crate::domain::entity::catalog::{Category, ServiceArea};
use crate::domain::repository::ProviderRepository;
use crate::error::ProviderResult;

const AREA_EDITORS: [UserRole; 2] = [UserRole::Admin, UserRole::LguStaff];

pub struct CatalogUseCase<R>
where
    R: ProviderRepository,
{
    repo: Arc<R>,
}

impl<R> CatalogUseCase<R>
where
    R: ProviderRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn categories(&self) -> ProviderResult<Vec<Category>> {
        self.repo.list_categories().await
    }

    pub async fn create_category(
        &self,
        actor: &ActorContext,
        name: &str,
        description: Option<String>,
    ) -> ProviderResult<Category> {
        actor.require_any_role(&[UserRole::Admin])?;

        let category = Category::new(name, description, Utc::now());
        self.repo.insert_category(&category).await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn service_areas(&self) -> ProviderResult<Vec<ServiceArea>> {
        self.repo.list_service_areas().await
    }

    pub async fn create_service_area(
        &self,
        actor: &ActorContext,
        name: &str,
        municipality: Option<String>,
    ) -> ProviderResult<ServiceArea> {
        actor.require_any_role(&AREA_EDITORS)?;

        let area = ServiceArea::new(name, municipality, Utc::now());
        self.repo.insert_service_area(&area).await?;

        tracing::info!(area_id = %area.id, name = %area.name, "Service area created");
        Ok(area)
    }
}
