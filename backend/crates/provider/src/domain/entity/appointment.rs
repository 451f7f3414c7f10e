//! Appointment Entity

use chrono::{DateTime, Duration, Utc};
use kernel::id::{AppointmentId, ProviderId};

use crate::domain::value_object::appointment_status::{AppointmentAction, AppointmentStatus};
use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: AppointmentId,
    pub provider_id: ProviderId,
    /// Public id of the booking customer
    pub customer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn request(
        provider_id: ProviderId,
        customer_id: String,
        scheduled_at: DateTime<Utc>,
        duration_minutes: i32,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AppointmentId::new(),
            provider_id,
            customer_id,
            scheduled_at,
            duration_minutes,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            status: AppointmentStatus::Requested,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open intervals: back-to-back slots do not overlap
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.scheduled_at < end && start < self.ends_at()
    }

    pub fn apply(&mut self, action: AppointmentAction, now: DateTime<Utc>) -> ProviderResult<()> {
        let next = action.target();
        if !self.status.can_transition_to(next) {
            return Err(ProviderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn nine_to_ten() -> Appointment {
        Appointment::request(ProviderId::new(), "cust-1".into(), at(9, 0), 60, None, at(8, 0))
    }

    #[test]
    fn test_overlap_detection() {
        let a = nine_to_ten();
        assert_eq!(a.ends_at(), at(10, 0));
        assert!(a.overlaps(at(9, 30), at(10, 30)));
        assert!(a.overlaps(at(8, 30), at(9, 1)));
        assert!(a.overlaps(at(9, 15), at(9, 45)));
        assert!(a.overlaps(at(8, 0), at(11, 0)));
        assert!(!a.overlaps(at(10, 0), at(11, 0)));
        assert!(!a.overlaps(at(8, 0), at(9, 0)));
    }

    #[test]
    fn test_lifecycle() {
        let mut a = nine_to_ten();
        a.apply(AppointmentAction::Confirm, at(8, 5)).unwrap();
        assert_eq!(a.status, AppointmentStatus::Confirmed);

        let err = a.apply(AppointmentAction::Decline, at(8, 6)).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InvalidTransition {
                from: AppointmentStatus::Confirmed,
                to: AppointmentStatus::Declined,
            }
        ));

        a.apply(AppointmentAction::Complete, at(10, 5)).unwrap();
        assert!(a.apply(AppointmentAction::Cancel, at(10, 6)).is_err());
        assert_eq!(a.updated_at, at(10, 5));
    }

    #[test]
    fn test_blank_notes_dropped() {
        let a = Appointment::request(
            ProviderId::new(),
            "cust-1".into(),
            at(9, 0),
            30,
            Some("  ".into()),
            at(8, 0),
        );
        assert_eq!(a.notes, None);
    }
}
