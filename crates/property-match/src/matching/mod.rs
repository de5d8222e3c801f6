//! Property/buyer matching: scoring, the persisted-match pipeline, notification dispatch,
//! on-demand recommendations, bulk reconciliation, and match statistics.

pub mod domain;
pub mod memory;
pub mod notify;
pub mod pipeline;
pub mod recommend;
pub mod reconcile;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    BudgetRange, BuyerPreferences, BuyerProfile, BuyerProfileId, ContactId, LocationPreference,
    MatchKey, MatchRecord, OrganizationId, Property, PropertyId, PropertyLocation,
    PropertySpecifications, PropertyStatus, SpecPreference, SpecificationPreferences,
};
pub use memory::{InMemoryCatalog, InMemoryMatchStore};
pub use notify::{render_match_message, DispatchSummary, NotificationDispatcher};
pub use pipeline::{CandidateScope, MatchRun, MatchingError, MatchingPipeline};
pub use recommend::{RankedProperty, Recommender, SearchOverrides};
pub use reconcile::{BulkMatchReport, BulkReconciler};
pub use repository::{
    BuyerProfileReader, ContactDirectory, MatchStore, MatchUpsert, MessageSender,
    PropertyFilter, PropertyReader, RepositoryError, SendError,
};
pub use router::matching_router;
pub use scoring::{score_property, MatchCriterion, PropertyScorer, ScoreComponent, ScoreOutcome};
pub use service::{MatchingCollaborators, MatchingService, MatchingServiceError};
pub use stats::MatchStats;
