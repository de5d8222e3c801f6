use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::config::MatchingConfig;
use crate::matching::domain::{
    BudgetRange, BuyerPreferences, BuyerProfile, BuyerProfileId, ContactId, LocationPreference,
    MatchKey, MatchRecord, OrganizationId, Property, PropertyId, PropertyLocation,
    PropertySpecifications, PropertyStatus, SpecPreference, SpecificationPreferences,
};
use crate::matching::memory::{InMemoryCatalog, InMemoryMatchStore};
use crate::matching::repository::{
    MatchStore, MatchUpsert, MessageSender, RepositoryError, SendError,
};
use crate::matching::service::{MatchingCollaborators, MatchingService};

pub(super) fn org() -> OrganizationId {
    OrganizationId::new("org-mumbai")
}

pub(super) fn other_org() -> OrganizationId {
    OrganizationId::new("org-pune")
}

pub(super) fn now() -> DateTime<Utc> {
    "2025-10-01T12:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("valid timestamp")
}

/// Buyer from the reference scenario: Bandra, 50-90 lakh, 2 or 3 bedrooms.
pub(super) fn bandra_preferences() -> BuyerPreferences {
    BuyerPreferences {
        location: LocationPreference {
            areas: vec!["Bandra".to_string()],
            city: None,
            radius_km: None,
        },
        budget: Some(BudgetRange {
            min: 5_000_000,
            max: 9_000_000,
        }),
        specifications: SpecificationPreferences {
            bedrooms: Some(SpecPreference::OneOf(vec![2, 3])),
            ..SpecificationPreferences::default()
        },
        amenities: Vec::new(),
    }
}

/// Bandra buyer who also cares about bathrooms, size, and two amenities.
pub(super) fn family_preferences() -> BuyerPreferences {
    let mut preferences = bandra_preferences();
    preferences.specifications.bathrooms = Some(SpecPreference::Range {
        min: Some(2),
        max: None,
    });
    preferences.specifications.area_sqft = Some(SpecPreference::Range {
        min: Some(900),
        max: Some(1500),
    });
    preferences.amenities = vec!["gym".to_string(), "pool".to_string()];
    preferences
}

pub(super) fn buyer(id: &str, preferences: BuyerPreferences) -> BuyerProfile {
    BuyerProfile {
        id: BuyerProfileId::new(id),
        organization_id: org(),
        contact_id: ContactId::new(format!("contact-{id}")),
        preferences,
        engagement_score: 55,
        last_active_at: Some(now() - Duration::days(1)),
    }
}

pub(super) fn bandra_property(id: &str, price: u64) -> Property {
    Property {
        id: PropertyId::new(id),
        organization_id: org(),
        title: "Sea-facing 3 BHK".to_string(),
        status: PropertyStatus::Available,
        location: PropertyLocation {
            area: "Bandra".to_string(),
            city: "Mumbai".to_string(),
            address: Some("14 Carter Road".to_string()),
        },
        price,
        currency: "INR".to_string(),
        specifications: PropertySpecifications {
            bedrooms: 3,
            bathrooms: 2,
            area_sqft: 1100,
            floor: Some(4),
        },
        amenities: Vec::new(),
        created_at: now() - Duration::hours(2),
    }
}

pub(super) fn andheri_property(id: &str) -> Property {
    let mut property = bandra_property(id, 12_000_000);
    property.title = "Compact 1 BHK".to_string();
    property.location.area = "Andheri".to_string();
    property.specifications.bedrooms = 1;
    property
}

pub(super) fn key(property_id: &str, buyer_id: &str) -> MatchKey {
    MatchKey::new(PropertyId::new(property_id), BuyerProfileId::new(buyer_id))
}

pub(super) fn record(property_id: &str, buyer_id: &str, score: u8) -> MatchRecord {
    MatchRecord {
        key: key(property_id, buyer_id),
        organization_id: org(),
        match_score: score,
        match_reasons: vec!["price fits your budget".to_string()],
        notified: false,
        notified_at: None,
        created_at: now(),
    }
}

pub(super) struct Harness {
    pub(super) catalog: Arc<InMemoryCatalog>,
    pub(super) store: Arc<InMemoryMatchStore>,
    pub(super) sender: Arc<RecordingSender>,
    pub(super) service: Arc<MatchingService>,
}

impl Harness {
    pub(super) fn add_property(&self, property: Property) {
        self.catalog
            .insert_property(property)
            .expect("property stored");
    }

    /// Adds the buyer together with a reachable address.
    pub(super) fn add_buyer(&self, buyer: BuyerProfile) {
        let address = format!("+91-{}", buyer.id);
        self.catalog
            .insert_contact(buyer.contact_id.clone(), address)
            .expect("contact stored");
        self.catalog.insert_buyer(buyer).expect("buyer stored");
    }

    pub(super) fn stored(&self, property_id: &str, buyer_id: &str) -> Option<MatchRecord> {
        self.store
            .fetch_match(&key(property_id, buyer_id))
            .expect("store readable")
    }
}

pub(super) fn harness() -> Harness {
    harness_with(MatchingConfig::default())
}

pub(super) fn harness_with(config: MatchingConfig) -> Harness {
    let catalog = Arc::new(InMemoryCatalog::default());
    let store = Arc::new(InMemoryMatchStore::default());
    let sender = Arc::new(RecordingSender::default());
    let service = Arc::new(MatchingService::new(
        MatchingCollaborators::in_memory(catalog.clone(), store.clone(), sender.clone()),
        config,
    ));
    Harness {
        catalog,
        store,
        sender,
        service,
    }
}

/// Captures sent messages; recipients listed in `failing` are rejected.
#[derive(Default)]
pub(super) struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub(super) fn fail_for(&self, recipient: &str) {
        self.failing
            .lock()
            .expect("sender mutex poisoned")
            .push(recipient.to_string());
    }

    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sender mutex poisoned").clone()
    }
}

impl MessageSender for RecordingSender {
    fn send_text(&self, recipient: &str, body: &str) -> Result<(), SendError> {
        let failing = self.failing.lock().expect("sender mutex poisoned");
        if failing.iter().any(|entry| entry == recipient) {
            return Err(SendError::Transport("gateway timeout".to_string()));
        }
        self.sent
            .lock()
            .expect("sender mutex poisoned")
            .push((recipient.to_string(), body.to_string()));
        Ok(())
    }
}

/// Store whose writes always fail; reads return nothing.
pub(super) struct UnavailableStore;

impl MatchStore for UnavailableStore {
    fn upsert(
        &self,
        _upsert: MatchUpsert,
        _computed_at: DateTime<Utc>,
    ) -> Result<MatchRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_match(&self, _key: &MatchKey) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(None)
    }

    fn delete_older_than(
        &self,
        _cutoff: DateTime<Utc>,
        _organization_id: Option<&OrganizationId>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn mark_notified(&self, _key: &MatchKey, _at: DateTime<Utc>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn records(
        &self,
        _organization_id: Option<&OrganizationId>,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
