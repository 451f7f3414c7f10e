//! Appointment booking and lifecycle

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{AppointmentId, ProviderId};
use kernel::role::UserRole;
use platform::actor::ActorContext;
use std::sync::Arc;

use crate::application::config::ProviderConfig;
use crate::domain::entity::appointment::Appointment;
use crate::domain::repository::{AppointmentParty, ProviderRepository};
use crate::domain::value_object::appointment_status::AppointmentAction;
use crate::error::{ProviderError, ProviderResult};

/// Appointment booking input
#[derive(Debug, Clone)]
pub struct BookingInput {
    /// Provider being booked
    pub provider_id: ProviderId,
    /// Start of the slot; must lie in the future
    pub scheduled_at: DateTime<Utc>,
    /// Slot length in minutes
    pub duration_minutes: i32,
    /// Free-text note from the customer
    pub notes: Option<String>,
}

pub struct AppointmentUseCase<R>
where
    R: ProviderRepository,
{
    repo: Arc<R>,
    config: Arc<ProviderConfig>,
}

impl<R> AppointmentUseCase<R>
where
    R: ProviderRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ProviderConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn book(
        &self,
        actor: &ActorContext,
        input: BookingInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<Appointment> {
        actor.require_any_role(&[UserRole::Customer])?;

        let (min, max) = (self.config.min_duration_minutes, self.config.max_duration_minutes);
        if !(min..=max).contains(&input.duration_minutes) {
            return Err(ProviderError::DurationOutOfRange { min, max });
        }
        if input.scheduled_at <= now {
            return Err(ProviderError::ScheduleInPast);
        }

        let provider = self
            .repo
            .find_provider(&input.provider_id)
            .await?
            .ok_or(ProviderError::ProviderNotFound)?;
        if !provider.is_active() {
            return Err(ProviderError::ProviderNotActive);
        }

        let appointment = Appointment::request(
            provider.id,
            actor.user_id.clone(),
            input.scheduled_at,
            input.duration_minutes,
            input.notes,
            now,
        );
        self.ensure_free(&appointment).await?;
        self.repo.insert_appointment(&appointment).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            provider_id = %provider.id,
            customer_id = %actor.user_id,
            scheduled_at = %appointment.scheduled_at,
            "Appointment requested"
        );
        Ok(appointment)
    }

    /// Bookings of a customer, or of the provider the actor owns
    pub async fn mine(&self, actor: &ActorContext, limit: i64) -> ProviderResult<Vec<Appointment>> {
        let party = if actor.role == UserRole::Provider {
            match self.repo.find_provider_by_owner(&actor.user_id).await? {
                Some(provider) => AppointmentParty::Provider(provider.id),
                None => return Ok(Vec::new()),
            }
        } else {
            AppointmentParty::Customer(actor.user_id.clone())
        };

        self.repo.list_appointments(&party, limit).await
    }

    pub async fn act(
        &self,
        actor: &ActorContext,
        id: &str,
        action: AppointmentAction,
        now: DateTime<Utc>,
    ) -> ProviderResult<Appointment> {
        let id: AppointmentId = id.parse().map_err(AppError::from)?;
        let mut appointment = self
            .repo
            .find_appointment(&id)
            .await?
            .ok_or(ProviderError::AppointmentNotFound)?;
        let provider = self
            .repo
            .find_provider(&appointment.provider_id)
            .await?
            .ok_or_else(|| {
                ProviderError::Internal(format!(
                    "Appointment {} refers to a missing provider",
                    appointment.id
                ))
            })?;

        let is_provider = provider.is_owned_by(&actor.user_id);
        let is_customer = actor.is(&appointment.customer_id);
        let allowed = if action.provider_only() {
            is_provider
        } else {
            is_provider || is_customer
        };
        if !allowed {
            tracing::warn!(
                appointment_id = %appointment.id,
                user_id = %actor.user_id,
                action = %action,
                "Appointment action by non-party"
            );
            return Err(ProviderError::NotParty);
        }

        let previous = appointment.status;
        appointment.apply(action, now)?;
        if action == AppointmentAction::Confirm {
            self.ensure_free(&appointment).await?;
        }
        self.repo.update_appointment(&appointment).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            user_id = %actor.user_id,
            from = %previous,
            to = %appointment.status,
            "Appointment updated"
        );
        Ok(appointment)
    }

    async fn ensure_free(&self, appointment: &Appointment) -> ProviderResult<()> {
        let taken = self
            .repo
            .has_confirmed_overlap(
                &appointment.provider_id,
                appointment.scheduled_at,
                appointment.ends_at(),
                Some(&appointment.id),
            )
            .await?;
        if taken {
            return Err(ProviderError::SlotTaken);
        }
        Ok(())
    }
}
