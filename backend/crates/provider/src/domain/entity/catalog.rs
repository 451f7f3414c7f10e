//! Reference data maintained by staff

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, ServiceAreaId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: &str, description: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            created_at: now,
        }
    }
}

/// Barangay or municipality a provider serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArea {
    pub id: ServiceAreaId,
    pub name: String,
    pub municipality: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ServiceArea {
    pub fn new(name: &str, municipality: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ServiceAreaId::new(),
            name: name.trim().to_string(),
            municipality: municipality.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
            created_at: now,
        }
    }
}
