use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    BuyerProfile, BuyerProfileId, MatchKey, MatchRecord, OrganizationId, Property, PropertyId,
};
use super::notify::{DispatchSummary, NotificationDispatcher};
use super::repository::{
    BuyerProfileReader, MatchStore, MatchUpsert, PropertyFilter, PropertyReader, RepositoryError,
};
use super::scoring::PropertyScorer;

/// Which (property, buyer) pairs a run considers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CandidateScope {
    /// One listing against every buyer in the organization.
    Property(PropertyId),
    /// Every available listing against one buyer.
    Buyer(BuyerProfileId),
    /// Available listings created inside the recent window against every buyer.
    RecentListings,
    /// Every available listing against every buyer.
    FullCatalog,
}

/// Outcome of one pipeline pass. `matches_created` counts inserts and in-place rescorings;
/// `matches` carries the notification state left by this run's dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRun {
    pub matches_created: usize,
    pub matches: Vec<MatchRecord>,
    pub notifications: DispatchSummary,
}

/// Fatal failures of a run. Rows upserted before the failure stay persisted.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error("buyer profile {0} not found")]
    BuyerNotFound(BuyerProfileId),
    #[error("{entity} {id} does not belong to organization {organization_id}")]
    OutsideOrganization {
        entity: &'static str,
        id: String,
        organization_id: OrganizationId,
    },
    #[error("{setting} of {value} falls outside the supported time range")]
    WindowOutOfRange { setting: &'static str, value: i64 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Candidate generation, scoring, threshold filter, upsert, and notification hand-off.
///
/// Pairs are processed sequentially; a run is not cancellable once started.
pub struct MatchingPipeline {
    properties: Arc<dyn PropertyReader>,
    buyers: Arc<dyn BuyerProfileReader>,
    store: Arc<dyn MatchStore>,
    dispatcher: NotificationDispatcher,
    scorer: PropertyScorer,
    auto_match_threshold: u8,
    recent_window_hours: i64,
}

impl MatchingPipeline {
    pub fn new(
        properties: Arc<dyn PropertyReader>,
        buyers: Arc<dyn BuyerProfileReader>,
        store: Arc<dyn MatchStore>,
        dispatcher: NotificationDispatcher,
        auto_match_threshold: u8,
        recent_window_hours: i64,
    ) -> Self {
        Self {
            properties,
            buyers,
            store,
            dispatcher,
            scorer: PropertyScorer::default(),
            auto_match_threshold,
            recent_window_hours,
        }
    }

    pub fn run(
        &self,
        organization_id: &OrganizationId,
        scope: &CandidateScope,
        now: DateTime<Utc>,
    ) -> Result<MatchRun, MatchingError> {
        let (properties, buyers) = self.candidates(organization_id, scope, now)?;
        if properties.is_empty() || buyers.is_empty() {
            info!(
                %organization_id,
                ?scope,
                properties = properties.len(),
                buyers = buyers.len(),
                "no candidate pairs for matching run"
            );
            return Ok(MatchRun::default());
        }

        let mut matches = Vec::new();
        for property in &properties {
            for buyer in &buyers {
                let outcome = self.scorer.score(&buyer.preferences, property);
                if outcome.score < self.auto_match_threshold {
                    continue;
                }

                let record = self.store.upsert(
                    MatchUpsert {
                        key: MatchKey::new(property.id.clone(), buyer.id.clone()),
                        organization_id: property.organization_id.clone(),
                        match_score: outcome.score,
                        match_reasons: outcome.reasons,
                    },
                    now,
                )?;
                matches.push(record);
            }
        }

        let pairs = properties.len() * buyers.len();
        let property_index: HashMap<PropertyId, Property> = properties
            .into_iter()
            .map(|property| (property.id.clone(), property))
            .collect();
        let buyer_index: HashMap<BuyerProfileId, BuyerProfile> = buyers
            .into_iter()
            .map(|buyer| (buyer.id.clone(), buyer))
            .collect();

        let notifications = self
            .dispatcher
            .dispatch(&mut matches, &property_index, &buyer_index, now);

        info!(
            %organization_id,
            ?scope,
            pairs,
            matches = matches.len(),
            sent = notifications.sent,
            failed = notifications.failed,
            "matching run finished"
        );

        Ok(MatchRun {
            matches_created: matches.len(),
            matches,
            notifications,
        })
    }

    fn candidates(
        &self,
        organization_id: &OrganizationId,
        scope: &CandidateScope,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Property>, Vec<BuyerProfile>), MatchingError> {
        match scope {
            CandidateScope::Property(property_id) => {
                let property = self
                    .properties
                    .fetch_property(property_id)?
                    .ok_or_else(|| MatchingError::PropertyNotFound(property_id.clone()))?;
                if &property.organization_id != organization_id {
                    return Err(MatchingError::OutsideOrganization {
                        entity: "property",
                        id: property_id.to_string(),
                        organization_id: organization_id.clone(),
                    });
                }
                if !property.status.is_matchable() {
                    info!(
                        %property_id,
                        status = property.status.label(),
                        "trigger property is not matchable"
                    );
                    return Ok((Vec::new(), Vec::new()));
                }
                let buyers = self.buyers.list_buyers(organization_id)?;
                Ok((vec![property], buyers))
            }
            CandidateScope::Buyer(buyer_id) => {
                let buyer = self
                    .buyers
                    .fetch_buyer(buyer_id)?
                    .ok_or_else(|| MatchingError::BuyerNotFound(buyer_id.clone()))?;
                if &buyer.organization_id != organization_id {
                    return Err(MatchingError::OutsideOrganization {
                        entity: "buyer profile",
                        id: buyer_id.to_string(),
                        organization_id: organization_id.clone(),
                    });
                }
                let properties = self
                    .properties
                    .list_properties(organization_id, &PropertyFilter::available())?;
                Ok((properties, vec![buyer]))
            }
            CandidateScope::RecentListings => {
                let created_after = Duration::try_hours(self.recent_window_hours)
                    .and_then(|window| now.checked_sub_signed(window))
                    .ok_or(MatchingError::WindowOutOfRange {
                        setting: "recent_window_hours",
                        value: self.recent_window_hours,
                    })?;
                let filter = PropertyFilter {
                    created_after: Some(created_after),
                    ..PropertyFilter::available()
                };
                let properties = self.properties.list_properties(organization_id, &filter)?;
                let buyers = self.buyers.list_buyers(organization_id)?;
                Ok((properties, buyers))
            }
            CandidateScope::FullCatalog => {
                let properties = self
                    .properties
                    .list_properties(organization_id, &PropertyFilter::available())?;
                let buyers = self.buyers.list_buyers(organization_id)?;
                Ok((properties, buyers))
            }
        }
    }
}
