//! Provider Entity

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ProviderId, ServiceAreaId};

use crate::domain::value_object::provider_status::ProviderStatus;
use crate::error::{ProviderError, ProviderResult};

/// Editable part of a provider profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub business_name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub service_area_ids: Vec<ServiceAreaId>,
    pub contact_phone: Option<String>,
}

impl ProviderProfile {
    /// Trim text and drop repeated areas, keeping first-seen order
    pub fn normalized(mut self) -> Self {
        self.business_name = self.business_name.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.contact_phone = self
            .contact_phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let mut seen = Vec::with_capacity(self.service_area_ids.len());
        for id in self.service_area_ids {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.service_area_ids = seen;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub id: ProviderId,
    /// Public id of the owning user
    pub owner_id: String,
    pub profile: ProviderProfile,
    pub status: ProviderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn register(owner_id: String, profile: ProviderProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: ProviderId::new(),
            owner_id,
            profile: profile.normalized(),
            status: ProviderStatus::PendingApproval,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn update_profile(&mut self, profile: ProviderProfile, now: DateTime<Utc>) {
        self.profile = profile.normalized();
        self.updated_at = now;
    }

    pub fn set_status(&mut self, next: ProviderStatus, now: DateTime<Utc>) -> ProviderResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ProviderError::InvalidProviderTransition {
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

    fn profile(areas: Vec<ServiceAreaId>) -> ProviderProfile {
        ProviderProfile {
            business_name: "  Aling Nena Catering ".into(),
            description: Some("   ".into()),
            category_id: CategoryId::new(),
            service_area_ids: areas,
            contact_phone: Some("0917 555 0101".into()),
        }
    }

    #[test]
    fn test_register_normalizes_profile() {
        let a = ServiceAreaId::new();
        let b = ServiceAreaId::new();
        let provider = Provider::register("owner-1".into(), profile(vec![a, b, a]), Utc::now());

        assert_eq!(provider.status, ProviderStatus::PendingApproval);
        assert_eq!(provider.profile.business_name, "Aling Nena Catering");
        assert_eq!(provider.profile.description, None);
        assert_eq!(provider.profile.service_area_ids, vec![a, b]);
        assert!(!provider.is_active());
    }

    #[test]
    fn test_status_changes() {
        let now = Utc::now();
        let mut provider = Provider::register("owner-1".into(), profile(vec![]), now);

        provider.set_status(ProviderStatus::Active, now).unwrap();
        assert!(provider.is_active());

        let err = provider.set_status(ProviderStatus::PendingApproval, now).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidProviderTransition { .. }));
        assert_eq!(provider.status, ProviderStatus::Active);
    }
}
