use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{BuyerProfile, BuyerProfileId, Property, SpecPreference};
use super::pipeline::MatchingError;
use super::repository::{BuyerProfileReader, PropertyFilter, PropertyReader};
use super::scoring::PropertyScorer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProperty {
    pub property: Property,
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Caller-supplied search filters. Omitted fields fall back to the buyer's preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOverrides {
    #[serde(default)]
    pub min_price: Option<u64>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub areas: Option<Vec<String>>,
    #[serde(default)]
    pub bedrooms: Option<Vec<u8>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchOverrides {
    /// Resolve into a listing filter, seeding unset fields from `buyer`.
    pub fn resolve(&self, buyer: &BuyerProfile) -> PropertyFilter {
        let preferences = &buyer.preferences;
        let bedrooms = self.bedrooms.clone().unwrap_or_else(|| {
            match &preferences.specifications.bedrooms {
                Some(SpecPreference::OneOf(values)) => values.clone(),
                _ => Vec::new(),
            }
        });

        PropertyFilter {
            min_price: self
                .min_price
                .or(preferences.budget.map(|budget| budget.min)),
            max_price: self
                .max_price
                .or(preferences.budget.map(|budget| budget.max)),
            areas: self
                .areas
                .clone()
                .unwrap_or_else(|| preferences.location.areas.clone()),
            bedrooms,
            limit: self.limit,
            ..PropertyFilter::available()
        }
    }
}

/// On-demand, read-only ranking of listings for one buyer. Nothing is persisted or sent.
pub struct Recommender {
    properties: Arc<dyn PropertyReader>,
    buyers: Arc<dyn BuyerProfileReader>,
    scorer: PropertyScorer,
    threshold: u8,
    page_size: usize,
}

impl Recommender {
    pub fn new(
        properties: Arc<dyn PropertyReader>,
        buyers: Arc<dyn BuyerProfileReader>,
        threshold: u8,
        page_size: usize,
    ) -> Self {
        Self {
            properties,
            buyers,
            scorer: PropertyScorer::default(),
            threshold,
            page_size,
        }
    }

    /// Top `limit` available listings scoring at or above the recommendation threshold.
    pub fn recommend(
        &self,
        buyer_id: &BuyerProfileId,
        limit: usize,
    ) -> Result<Vec<RankedProperty>, MatchingError> {
        let buyer = self.buyer(buyer_id)?;
        let filter = PropertyFilter {
            limit: Some(self.page_size),
            ..PropertyFilter::available()
        };
        let listings = self
            .properties
            .list_properties(&buyer.organization_id, &filter)?;

        let mut ranked: Vec<RankedProperty> = self
            .rank(&buyer, listings)
            .into_iter()
            .filter(|entry| entry.score >= self.threshold)
            .collect();
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Every listing passing the resolved filters, scored and sorted, with no threshold.
    pub fn search(
        &self,
        buyer_id: &BuyerProfileId,
        overrides: &SearchOverrides,
    ) -> Result<Vec<RankedProperty>, MatchingError> {
        let buyer = self.buyer(buyer_id)?;
        let filter = overrides.resolve(&buyer);
        let listings = self
            .properties
            .list_properties(&buyer.organization_id, &filter)?;
        Ok(self.rank(&buyer, listings))
    }

    fn buyer(&self, buyer_id: &BuyerProfileId) -> Result<BuyerProfile, MatchingError> {
        self.buyers
            .fetch_buyer(buyer_id)?
            .ok_or_else(|| MatchingError::BuyerNotFound(buyer_id.clone()))
    }

    fn rank(&self, buyer: &BuyerProfile, listings: Vec<Property>) -> Vec<RankedProperty> {
        let mut ranked: Vec<RankedProperty> = listings
            .into_iter()
            .map(|property| {
                let outcome = self.scorer.score(&buyer.preferences, &property);
                RankedProperty {
                    property,
                    score: outcome.score,
                    reasons: outcome.reasons,
                }
            })
            .collect();
        ranked.sort_by(|left, right| right.score.cmp(&left.score));
        ranked
    }
}
