use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use property_match::config::MatchingConfig;
use property_match::error::AppError;
use property_match::matching::{
    BudgetRange, BuyerPreferences, BuyerProfile, BuyerProfileId, ContactId, InMemoryCatalog,
    InMemoryMatchStore, LocationPreference, MatchingCollaborators, MatchingError,
    MatchingService, MatchingServiceError, MessageSender, OrganizationId, Property, PropertyId,
    PropertyLocation, PropertySpecifications, PropertyStatus, RepositoryError, SendError,
    SpecPreference, SpecificationPreferences,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) const DEMO_ORGANIZATION: &str = "org-demo";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes match notifications to the log in place of a messaging channel.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingMessageSender;

impl MessageSender for LoggingMessageSender {
    fn send_text(&self, recipient: &str, body: &str) -> Result<(), SendError> {
        if recipient.trim().is_empty() {
            return Err(SendError::Rejected("empty recipient address".to_string()));
        }
        let headline = body.lines().next().unwrap_or_default();
        info!(recipient, headline, "match notification delivered");
        Ok(())
    }
}

pub(crate) struct InMemoryMatching {
    pub(crate) catalog: Arc<InMemoryCatalog>,
    pub(crate) store: Arc<InMemoryMatchStore>,
    pub(crate) service: Arc<MatchingService>,
}

pub(crate) fn in_memory_matching(config: MatchingConfig) -> InMemoryMatching {
    let catalog = Arc::new(InMemoryCatalog::default());
    let store = Arc::new(InMemoryMatchStore::default());
    let service = Arc::new(MatchingService::new(
        MatchingCollaborators::in_memory(
            catalog.clone(),
            store.clone(),
            Arc::new(LoggingMessageSender),
        ),
        config,
    ));
    InMemoryMatching {
        catalog,
        store,
        service,
    }
}

pub(crate) fn repository_error(err: RepositoryError) -> AppError {
    AppError::from(MatchingServiceError::from(MatchingError::from(err)))
}

/// Buyer ids seeded by [`seed_demo_catalog`], in presentation order.
pub(crate) const DEMO_BUYERS: [&str; 3] = [
    "demo-buyer-family",
    "demo-buyer-upgrade",
    "demo-buyer-starter",
];

pub(crate) fn seed_demo_catalog(
    catalog: &InMemoryCatalog,
    organization_id: &OrganizationId,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let mut listings = [
        demo_listing(
            "demo-bandra-3bhk",
            "Sea-facing 3 BHK near Carter Road",
            ("Bandra", 8_500_000),
            (3, 2, 1_150, Some(7)),
            &["gym", "pool", "covered parking"],
            now - Duration::hours(3),
        ),
        demo_listing(
            "demo-khar-2bhk",
            "Renovated 2 BHK off Linking Road",
            ("Khar", 9_600_000),
            (2, 2, 900, Some(3)),
            &["gym"],
            now - Duration::days(4),
        ),
        demo_listing(
            "demo-powai-3bhk",
            "Lake-view 3 BHK in Hiranandani",
            ("Powai", 14_000_000),
            (3, 3, 1_400, Some(12)),
            &["pool", "clubhouse"],
            now - Duration::hours(20),
        ),
        demo_listing(
            "demo-andheri-1bhk",
            "Starter 1 BHK near metro",
            ("Andheri", 6_200_000),
            (1, 1, 550, Some(2)),
            &[],
            now - Duration::days(9),
        ),
    ];
    listings[3].status = PropertyStatus::Sold;
    for mut listing in listings {
        listing.organization_id = organization_id.clone();
        catalog.insert_property(listing)?;
    }

    let buyers = [
        (
            DEMO_BUYERS[0],
            Some("+91-98200-10001"),
            BuyerPreferences {
                location: LocationPreference {
                    areas: vec!["Bandra".to_string(), "Khar".to_string()],
                    city: Some("Mumbai".to_string()),
                    radius_km: None,
                },
                budget: Some(BudgetRange {
                    min: 7_000_000,
                    max: 9_000_000,
                }),
                specifications: SpecificationPreferences {
                    bedrooms: Some(SpecPreference::OneOf(vec![2, 3])),
                    bathrooms: Some(SpecPreference::Range {
                        min: Some(2),
                        max: None,
                    }),
                    ..SpecificationPreferences::default()
                },
                amenities: vec!["gym".to_string(), "pool".to_string()],
            },
        ),
        (
            DEMO_BUYERS[1],
            Some("+91-98200-10002"),
            BuyerPreferences {
                location: LocationPreference {
                    areas: vec!["Powai".to_string()],
                    city: None,
                    radius_km: None,
                },
                budget: Some(BudgetRange {
                    min: 12_000_000,
                    max: 15_000_000,
                }),
                specifications: SpecificationPreferences {
                    bedrooms: Some(SpecPreference::Range {
                        min: Some(3),
                        max: None,
                    }),
                    area_sqft: Some(SpecPreference::Range {
                        min: Some(1_200),
                        max: None,
                    }),
                    ..SpecificationPreferences::default()
                },
                amenities: vec!["clubhouse".to_string()],
            },
        ),
        (
            DEMO_BUYERS[2],
            None,
            BuyerPreferences {
                location: LocationPreference {
                    areas: vec!["Andheri".to_string()],
                    city: None,
                    radius_km: None,
                },
                budget: Some(BudgetRange {
                    min: 5_000_000,
                    max: 7_000_000,
                }),
                specifications: SpecificationPreferences {
                    bedrooms: Some(SpecPreference::OneOf(vec![1])),
                    ..SpecificationPreferences::default()
                },
                amenities: Vec::new(),
            },
        ),
    ];
    for (id, address, preferences) in buyers {
        let contact_id = ContactId::new(format!("contact-{id}"));
        if let Some(address) = address {
            catalog.insert_contact(contact_id.clone(), address)?;
        }
        catalog.insert_buyer(BuyerProfile {
            id: BuyerProfileId::new(id),
            organization_id: organization_id.clone(),
            contact_id,
            preferences,
            engagement_score: 60,
            last_active_at: Some(now - Duration::days(2)),
        })?;
    }

    Ok(())
}

fn demo_listing(
    id: &str,
    title: &str,
    (area, price): (&str, u64),
    (bedrooms, bathrooms, area_sqft, floor): (u8, u8, u32, Option<i16>),
    amenities: &[&str],
    created_at: DateTime<Utc>,
) -> Property {
    Property {
        id: PropertyId::new(id),
        organization_id: OrganizationId::new(DEMO_ORGANIZATION),
        title: title.to_string(),
        status: PropertyStatus::Available,
        location: PropertyLocation {
            area: area.to_string(),
            city: "Mumbai".to_string(),
            address: None,
        },
        price,
        currency: "INR".to_string(),
        specifications: PropertySpecifications {
            bedrooms,
            bathrooms,
            area_sqft,
            floor,
        },
        amenities: amenities.iter().map(|amenity| amenity.to_string()).collect(),
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use property_match::matching::{BuyerProfileReader, ContactDirectory, PropertyReader};

    #[test]
    fn logging_sender_rejects_blank_recipient() {
        let sender = LoggingMessageSender;
        assert!(sender.send_text("+91-98200-10001", "hello").is_ok());
        assert!(matches!(
            sender.send_text("  ", "hello"),
            Err(SendError::Rejected(_))
        ));
    }

    #[test]
    fn demo_catalog_is_scoped_to_requested_organization() {
        let catalog = InMemoryCatalog::default();
        let organization = OrganizationId::new("org-sample");
        seed_demo_catalog(&catalog, &organization, Utc::now()).expect("catalog seeds");

        let sold = catalog
            .fetch_property(&PropertyId::new("demo-andheri-1bhk"))
            .expect("readable")
            .expect("listing present");
        assert_eq!(sold.organization_id, organization);
        assert_eq!(sold.status, PropertyStatus::Sold);

        let buyers = catalog.list_buyers(&organization).expect("readable");
        assert_eq!(buyers.len(), DEMO_BUYERS.len());

        let starter = ContactId::new("contact-demo-buyer-starter");
        assert!(catalog
            .outbound_address(&starter)
            .expect("readable")
            .is_none());
    }
}
