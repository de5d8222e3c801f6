use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{BuyerProfileId, OrganizationId, PropertyId};
use super::memory::{InMemoryCatalog, InMemoryMatchStore};
use super::notify::NotificationDispatcher;
use super::pipeline::{CandidateScope, MatchRun, MatchingError, MatchingPipeline};
use super::recommend::{RankedProperty, Recommender, SearchOverrides};
use super::reconcile::{BulkMatchReport, BulkReconciler};
use super::repository::{
    BuyerProfileReader, ContactDirectory, MatchStore, MessageSender, PropertyReader,
};
use super::stats::MatchStats;
use crate::config::MatchingConfig;

/// Largest `limit` accepted by [`MatchingService::recommend`].
pub const MAX_RECOMMENDATIONS: usize = 100;

/// Data-access and messaging collaborators injected into the service.
#[derive(Clone)]
pub struct MatchingCollaborators {
    pub properties: Arc<dyn PropertyReader>,
    pub buyers: Arc<dyn BuyerProfileReader>,
    pub contacts: Arc<dyn ContactDirectory>,
    pub store: Arc<dyn MatchStore>,
    pub sender: Arc<dyn MessageSender>,
}

impl MatchingCollaborators {
    pub fn in_memory(
        catalog: Arc<InMemoryCatalog>,
        store: Arc<InMemoryMatchStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            properties: catalog.clone(),
            buyers: catalog.clone(),
            contacts: catalog,
            store,
            sender,
        }
    }
}

/// Service composing the pipeline, recommender, reconciliation job, and statistics.
pub struct MatchingService {
    pipeline: Arc<MatchingPipeline>,
    recommender: Recommender,
    reconciler: BulkReconciler,
    store: Arc<dyn MatchStore>,
    config: MatchingConfig,
}

impl MatchingService {
    pub fn new(collaborators: MatchingCollaborators, config: MatchingConfig) -> Self {
        let MatchingCollaborators {
            properties,
            buyers,
            contacts,
            store,
            sender,
        } = collaborators;

        let dispatcher =
            NotificationDispatcher::new(contacts, sender, store.clone(), config.notification_policy);
        let pipeline = Arc::new(MatchingPipeline::new(
            properties.clone(),
            buyers.clone(),
            store.clone(),
            dispatcher,
            config.auto_match_threshold,
            config.recent_window_hours,
        ));
        let recommender = Recommender::new(
            properties,
            buyers,
            config.recommendation_threshold,
            config.recommendation_page_size,
        );
        let reconciler = BulkReconciler::new(
            pipeline.clone(),
            store.clone(),
            config.retention_days,
            config.retention_scope,
        );

        Self {
            pipeline,
            recommender,
            reconciler,
            store,
            config,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Match one new listing against all buyers, or recent listings when no trigger is given.
    pub fn trigger_matching(
        &self,
        organization_id: &OrganizationId,
        property_id: Option<&PropertyId>,
    ) -> Result<MatchRun, MatchingServiceError> {
        self.trigger_matching_at(organization_id, property_id, Utc::now())
    }

    pub fn trigger_matching_at(
        &self,
        organization_id: &OrganizationId,
        property_id: Option<&PropertyId>,
        now: DateTime<Utc>,
    ) -> Result<MatchRun, MatchingServiceError> {
        let scope = match property_id {
            Some(id) => CandidateScope::Property(id.clone()),
            None => CandidateScope::RecentListings,
        };
        Ok(self.pipeline.run(organization_id, &scope, now)?)
    }

    /// Match a newly created buyer profile against every available listing.
    pub fn match_buyer(
        &self,
        organization_id: &OrganizationId,
        buyer_id: &BuyerProfileId,
    ) -> Result<MatchRun, MatchingServiceError> {
        self.match_buyer_at(organization_id, buyer_id, Utc::now())
    }

    pub fn match_buyer_at(
        &self,
        organization_id: &OrganizationId,
        buyer_id: &BuyerProfileId,
        now: DateTime<Utc>,
    ) -> Result<MatchRun, MatchingServiceError> {
        let scope = CandidateScope::Buyer(buyer_id.clone());
        Ok(self.pipeline.run(organization_id, &scope, now)?)
    }

    pub fn recommend(
        &self,
        buyer_id: &BuyerProfileId,
        limit: usize,
    ) -> Result<Vec<RankedProperty>, MatchingServiceError> {
        if limit == 0 || limit > MAX_RECOMMENDATIONS {
            return Err(MatchingServiceError::InvalidRequest(format!(
                "limit must be between 1 and {MAX_RECOMMENDATIONS}"
            )));
        }
        Ok(self.recommender.recommend(buyer_id, limit)?)
    }

    pub fn search(
        &self,
        buyer_id: &BuyerProfileId,
        overrides: &SearchOverrides,
    ) -> Result<Vec<RankedProperty>, MatchingServiceError> {
        if let (Some(min), Some(max)) = (overrides.min_price, overrides.max_price) {
            if min > max {
                return Err(MatchingServiceError::InvalidRequest(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }
        Ok(self.recommender.search(buyer_id, overrides)?)
    }

    pub fn bulk_match(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<BulkMatchReport, MatchingServiceError> {
        self.bulk_match_at(organization_id, Utc::now())
    }

    pub fn bulk_match_at(
        &self,
        organization_id: &OrganizationId,
        now: DateTime<Utc>,
    ) -> Result<BulkMatchReport, MatchingServiceError> {
        Ok(self.reconciler.bulk_match(organization_id, now)?)
    }

    pub fn get_stats(
        &self,
        organization_id: Option<&OrganizationId>,
    ) -> Result<MatchStats, MatchingServiceError> {
        let records = self
            .store
            .records(organization_id)
            .map_err(MatchingError::from)?;
        Ok(MatchStats::from_records(&records))
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
