use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    BuyerProfile, BuyerProfileId, ContactId, MatchKey, MatchRecord, OrganizationId, Property,
    PropertyId, PropertyStatus,
};

/// Filters understood by [`PropertyReader::list_properties`]. Unset fields do not constrain the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub bedrooms: Vec<u8>,
    pub limit: Option<usize>,
}

impl PropertyFilter {
    pub fn available() -> Self {
        Self {
            status: Some(PropertyStatus::Available),
            ..Self::default()
        }
    }

    /// Whether `property` passes every filter except `limit`.
    pub fn admits(&self, property: &Property) -> bool {
        if self.status.is_some_and(|status| property.status != status) {
            return false;
        }
        if self
            .created_after
            .is_some_and(|after| property.created_at < after)
        {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if !self.areas.is_empty()
            && !self.areas.iter().any(|area| {
                area.trim().eq_ignore_ascii_case(property.location.area.trim())
                    || area.trim().eq_ignore_ascii_case(property.location.city.trim())
            })
        {
            return false;
        }
        if !self.bedrooms.is_empty()
            && !self.bedrooms.contains(&property.specifications.bedrooms)
        {
            return false;
        }
        true
    }
}

/// Read model over listings owned by the listing-management collaborator.
pub trait PropertyReader: Send + Sync {
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn list_properties(
        &self,
        organization_id: &OrganizationId,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, RepositoryError>;
}

/// Read model over buyer profiles owned by the CRM collaborator.
pub trait BuyerProfileReader: Send + Sync {
    fn fetch_buyer(&self, id: &BuyerProfileId) -> Result<Option<BuyerProfile>, RepositoryError>;
    fn list_buyers(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<BuyerProfile>, RepositoryError>;
}

/// Resolves the outbound messaging address (phone, chat id) for a contact.
pub trait ContactDirectory: Send + Sync {
    fn outbound_address(&self, contact_id: &ContactId) -> Result<Option<String>, RepositoryError>;
}

/// Score data written by an upsert. Notification state is not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchUpsert {
    pub key: MatchKey,
    pub organization_id: OrganizationId,
    pub match_score: u8,
    pub match_reasons: Vec<String>,
}

/// Persistence for match rows keyed by (property, buyer profile).
pub trait MatchStore: Send + Sync {
    /// Insert the row or overwrite score, reasons, and `created_at` in place.
    /// `notified`/`notified_at` of an existing row must be preserved.
    fn upsert(
        &self,
        upsert: MatchUpsert,
        computed_at: DateTime<Utc>,
    ) -> Result<MatchRecord, RepositoryError>;
    fn fetch_match(&self, key: &MatchKey) -> Result<Option<MatchRecord>, RepositoryError>;
    /// Delete rows computed before `cutoff`, optionally only within one organization.
    fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        organization_id: Option<&OrganizationId>,
    ) -> Result<usize, RepositoryError>;
    fn mark_notified(&self, key: &MatchKey, at: DateTime<Utc>) -> Result<(), RepositoryError>;
    fn records(
        &self,
        organization_id: Option<&OrganizationId>,
    ) -> Result<Vec<MatchRecord>, RepositoryError>;
}

/// Error enumeration for collaborator read/write failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound messaging channel (WhatsApp, SMS, ...).
pub trait MessageSender: Send + Sync {
    fn send_text(&self, recipient: &str, body: &str) -> Result<(), SendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("recipient rejected: {0}")]
    Rejected(String),
    #[error("messaging transport unavailable: {0}")]
    Transport(String),
}
