//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::{AppointmentId, CategoryId, ProviderId, ServiceAreaId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::appointment::Appointment;
use crate::domain::entity::catalog::{Category, ServiceArea};
use crate::domain::entity::provider::{Provider, ProviderProfile};
use crate::domain::repository::{AppointmentParty, ProviderFilter, ProviderRepository};
use crate::domain::value_object::{AppointmentStatus, ProviderStatus};
use crate::error::{ProviderError, ProviderResult};

/// `exclusion_violation`; raised by the confirmed-slot constraint
const EXCLUSION_VIOLATION: &str = "23P01";

const PROVIDER_COLUMNS: &str = r#"
    p.provider_id,
    p.owner_id,
    p.business_name,
    p.description,
    p.category_id,
    p.contact_phone,
    p.status,
    p.created_at,
    p.updated_at,
    ARRAY(
        SELECT psa.area_id FROM provider_service_areas psa
        WHERE psa.provider_id = p.provider_id
        ORDER BY psa.position
    ) AS service_area_ids
"#;

const APPOINTMENT_COLUMNS: &str = r#"
    appointment_id,
    provider_id,
    customer_id,
    scheduled_at,
    duration_minutes,
    notes,
    status,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PgProviderRepository {
    pool: PgPool,
}

impl PgProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn area_uuids(ids: &[ServiceAreaId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

/// Map constraint violations raised by a write onto domain errors
fn write_error(e: sqlx::Error, on_unique: ProviderError) -> ProviderError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_unique,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ProviderError::UnknownReference("reference")
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            ProviderError::SlotTaken
        }
        other => other.into(),
    }
}

impl ProviderRepository for PgProviderRepository {
    // ===== Catalog =====

    async fn insert_category(&self, category: &Category) -> ProviderResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (category_id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, ProviderError::DuplicateName("Category")))?;

        Ok(())
    }

    async fn list_categories(&self) -> ProviderResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category_id, name, description, created_at
            FROM categories
            ORDER BY lower(name)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn category_exists(&self, id: &CategoryId) -> ProviderResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE category_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_service_area(&self, area: &ServiceArea) -> ProviderResult<()> {
        sqlx::query(
            r#"
            INSERT INTO service_areas (area_id, name, municipality, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(area.id.as_uuid())
        .bind(&area.name)
        .bind(&area.municipality)
        .bind(area.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, ProviderError::DuplicateName("Service area")))?;

        Ok(())
    }

    async fn list_service_areas(&self) -> ProviderResult<Vec<ServiceArea>> {
        let rows = sqlx::query_as::<_, ServiceAreaRow>(
            r#"
            SELECT area_id, name, municipality, created_at
            FROM service_areas
            ORDER BY lower(name), lower(coalesce(municipality, ''))
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ServiceAreaRow::into_area).collect())
    }

    async fn count_service_areas(&self, ids: &[ServiceAreaId]) -> ProviderResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_areas WHERE area_id = ANY($1)",
        )
        .bind(area_uuids(ids))
        .fetch_one(&self.pool)
        .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ===== Providers =====

    async fn insert_provider(&self, provider: &Provider) -> ProviderResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO providers (
                provider_id,
                owner_id,
                business_name,
                description,
                category_id,
                contact_phone,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(provider.id.as_uuid())
        .bind(&provider.owner_id)
        .bind(&provider.profile.business_name)
        .bind(&provider.profile.description)
        .bind(provider.profile.category_id.as_uuid())
        .bind(&provider.profile.contact_phone)
        .bind(provider.status.code())
        .bind(provider.created_at)
        .bind(provider.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, ProviderError::ProfileExists))?;

        replace_areas(&mut tx, &provider.id, &provider.profile.service_area_ids).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_provider(&self, id: &ProviderId) -> ProviderResult<Option<Provider>> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM providers p WHERE p.provider_id = $1");
        let row = sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProviderRow::into_provider).transpose()
    }

    async fn find_provider_by_owner(&self, owner_id: &str) -> ProviderResult<Option<Provider>> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM providers p WHERE p.owner_id = $1");
        let row = sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProviderRow::into_provider).transpose()
    }

    async fn list_providers(&self, filter: &ProviderFilter) -> ProviderResult<Vec<Provider>> {
        let sql = format!(
            r#"
            SELECT {PROVIDER_COLUMNS} FROM providers p
            WHERE p.status = $1
              AND ($2::uuid IS NULL OR p.category_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM provider_service_areas psa
                  WHERE psa.provider_id = p.provider_id AND psa.area_id = $3
              ))
            ORDER BY lower(p.business_name), p.provider_id
            LIMIT $4
            "#
        );
        let rows = sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(filter.status.code())
            .bind(filter.category_id.map(|id| id.into_uuid()))
            .bind(filter.area_id.map(|id| id.into_uuid()))
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProviderRow::into_provider).collect()
    }

    async fn update_provider(&self, provider: &Provider) -> ProviderResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE providers SET
                business_name = $2,
                description = $3,
                category_id = $4,
                contact_phone = $5,
                status = $6,
                updated_at = $7
            WHERE provider_id = $1
            "#,
        )
        .bind(provider.id.as_uuid())
        .bind(&provider.profile.business_name)
        .bind(&provider.profile.description)
        .bind(provider.profile.category_id.as_uuid())
        .bind(&provider.profile.contact_phone)
        .bind(provider.status.code())
        .bind(provider.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, ProviderError::ProfileExists))?;

        replace_areas(&mut tx, &provider.id, &provider.profile.service_area_ids).await?;
        tx.commit().await?;
        Ok(())
    }

    // ===== Appointments =====

    async fn insert_appointment(&self, a: &Appointment) -> ProviderResult<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (
                appointment_id,
                provider_id,
                customer_id,
                scheduled_at,
                ends_at,
                duration_minutes,
                notes,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(a.id.as_uuid())
        .bind(a.provider_id.as_uuid())
        .bind(&a.customer_id)
        .bind(a.scheduled_at)
        .bind(a.ends_at())
        .bind(a.duration_minutes)
        .bind(&a.notes)
        .bind(a.status.code())
        .bind(a.created_at)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, ProviderError::SlotTaken))?;

        Ok(())
    }

    async fn find_appointment(&self, id: &AppointmentId) -> ProviderResult<Option<Appointment>> {
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = $1");
        let row = sqlx::query_as::<_, AppointmentRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AppointmentRow::into_appointment).transpose()
    }

    async fn list_appointments(
        &self,
        party: &AppointmentParty,
        limit: i64,
    ) -> ProviderResult<Vec<Appointment>> {
        let (customer_id, provider_id) = match party {
            AppointmentParty::Customer(customer_id) => (Some(customer_id.as_str()), None),
            AppointmentParty::Provider(provider_id) => (None, Some(provider_id.into_uuid())),
        };
        let sql = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS} FROM appointments
            WHERE ($1::text IS NULL OR customer_id = $1)
              AND ($2::uuid IS NULL OR provider_id = $2)
            ORDER BY scheduled_at ASC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, AppointmentRow>(&sql)
            .bind(customer_id)
            .bind(provider_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AppointmentRow::into_appointment).collect()
    }

    async fn has_confirmed_overlap(
        &self,
        provider_id: &ProviderId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&AppointmentId>,
    ) -> ProviderResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM appointments
                WHERE provider_id = $1
                  AND status = 'confirmed'
                  AND scheduled_at < $3
                  AND ends_at > $2
                  AND ($4::uuid IS NULL OR appointment_id <> $4)
            )
            "#,
        )
        .bind(provider_id.as_uuid())
        .bind(start)
        .bind(end)
        .bind(exclude.map(|id| *id.as_uuid()))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn update_appointment(&self, a: &Appointment) -> ProviderResult<()> {
        sqlx::query(
            r#"
            UPDATE appointments SET
                status = $2,
                updated_at = $3
            WHERE appointment_id = $1
            "#,
        )
        .bind(a.id.as_uuid())
        .bind(a.status.code())
        .bind(a.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, ProviderError::SlotTaken))?;

        Ok(())
    }
}

async fn replace_areas(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    provider_id: &ProviderId,
    areas: &[ServiceAreaId],
) -> ProviderResult<()> {
    sqlx::query("DELETE FROM provider_service_areas WHERE provider_id = $1")
        .bind(provider_id.as_uuid())
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO provider_service_areas (provider_id, area_id, position)
        SELECT $1, a.area_id, a.position
        FROM UNNEST($2::uuid[]) WITH ORDINALITY AS a(area_id, position)
        "#,
    )
    .bind(provider_id.as_uuid())
    .bind(area_uuids(areas))
    .execute(&mut **tx)
    .await
    .map_err(|e| write_error(e, ProviderError::UnknownReference("serviceAreaIds")))?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::from_uuid(self.category_id),
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceAreaRow {
    area_id: Uuid,
    name: String,
    municipality: Option<String>,
    created_at: DateTime<Utc>,
}

impl ServiceAreaRow {
    fn into_area(self) -> ServiceArea {
        ServiceArea {
            id: ServiceAreaId::from_uuid(self.area_id),
            name: self.name,
            municipality: self.municipality,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    provider_id: Uuid,
    owner_id: String,
    business_name: String,
    description: Option<String>,
    category_id: Uuid,
    contact_phone: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    service_area_ids: Vec<Uuid>,
}

impl ProviderRow {
    fn into_provider(self) -> ProviderResult<Provider> {
        let status = ProviderStatus::from_code(&self.status).ok_or_else(|| {
            ProviderError::Internal(format!("Unknown provider status: {}", self.status))
        })?;

        Ok(Provider {
            id: ProviderId::from_uuid(self.provider_id),
            owner_id: self.owner_id,
            profile: ProviderProfile {
                business_name: self.business_name,
                description: self.description,
                category_id: CategoryId::from_uuid(self.category_id),
                service_area_ids: self
                    .service_area_ids
                    .into_iter()
                    .map(ServiceAreaId::from_uuid)
                    .collect(),
                contact_phone: self.contact_phone,
            },
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    appointment_id: Uuid,
    provider_id: Uuid,
    customer_id: String,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AppointmentRow {
    fn into_appointment(self) -> ProviderResult<Appointment> {
        let status = AppointmentStatus::from_code(&self.status).ok_or_else(|| {
            ProviderError::Internal(format!("Unknown appointment status: {}", self.status))
        })?;

        Ok(Appointment {
            id: AppointmentId::from_uuid(self.appointment_id),
            provider_id: ProviderId::from_uuid(self.provider_id),
            customer_id: self.customer_id,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
