//! Mutex-backed collaborators for the demo server and tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::domain::{
    BuyerProfile, BuyerProfileId, ContactId, MatchKey, MatchRecord, OrganizationId, Property,
    PropertyId,
};
use super::repository::{
    BuyerProfileReader, ContactDirectory, MatchStore, MatchUpsert, PropertyFilter,
    PropertyReader, RepositoryError,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} mutex poisoned")))
}

/// Listings, buyer profiles, and contact addresses held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    properties: Mutex<BTreeMap<PropertyId, Property>>,
    buyers: Mutex<BTreeMap<BuyerProfileId, BuyerProfile>>,
    contacts: Mutex<BTreeMap<ContactId, String>>,
}

impl InMemoryCatalog {
    pub fn insert_property(&self, property: Property) -> Result<(), RepositoryError> {
        lock(&self.properties, "property")?.insert(property.id.clone(), property);
        Ok(())
    }

    pub fn insert_buyer(&self, buyer: BuyerProfile) -> Result<(), RepositoryError> {
        lock(&self.buyers, "buyer")?.insert(buyer.id.clone(), buyer);
        Ok(())
    }

    pub fn insert_contact(
        &self,
        contact_id: ContactId,
        address: impl Into<String>,
    ) -> Result<(), RepositoryError> {
        lock(&self.contacts, "contact")?.insert(contact_id, address.into());
        Ok(())
    }
}

impl PropertyReader for InMemoryCatalog {
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(lock(&self.properties, "property")?.get(id).cloned())
    }

    fn list_properties(
        &self,
        organization_id: &OrganizationId,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, RepositoryError> {
        let guard = lock(&self.properties, "property")?;
        let matching = guard
            .values()
            .filter(|property| &property.organization_id == organization_id)
            .filter(|property| filter.admits(property))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }
}

impl BuyerProfileReader for InMemoryCatalog {
    fn fetch_buyer(&self, id: &BuyerProfileId) -> Result<Option<BuyerProfile>, RepositoryError> {
        Ok(lock(&self.buyers, "buyer")?.get(id).cloned())
    }

    fn list_buyers(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<BuyerProfile>, RepositoryError> {
        let guard = lock(&self.buyers, "buyer")?;
        Ok(guard
            .values()
            .filter(|buyer| &buyer.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

impl ContactDirectory for InMemoryCatalog {
    fn outbound_address(&self, contact_id: &ContactId) -> Result<Option<String>, RepositoryError> {
        Ok(lock(&self.contacts, "contact")?.get(contact_id).cloned())
    }
}

/// Match rows keyed by (property, buyer profile); the map key enforces uniqueness.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    rows: Mutex<BTreeMap<MatchKey, MatchRecord>>,
}

impl InMemoryMatchStore {
    pub fn len(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchStore for InMemoryMatchStore {
    fn upsert(
        &self,
        upsert: MatchUpsert,
        computed_at: DateTime<Utc>,
    ) -> Result<MatchRecord, RepositoryError> {
        let mut rows = lock(&self.rows, "match")?;
        let MatchUpsert {
            key,
            organization_id,
            match_score,
            match_reasons,
        } = upsert;

        let record = rows
            .entry(key.clone())
            .and_modify(|existing| {
                existing.match_score = match_score;
                existing.match_reasons = match_reasons.clone();
                existing.created_at = computed_at;
            })
            .or_insert_with(|| MatchRecord {
                key,
                organization_id,
                match_score,
                match_reasons,
                notified: false,
                notified_at: None,
                created_at: computed_at,
            });
        Ok(record.clone())
    }

    fn fetch_match(&self, key: &MatchKey) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(lock(&self.rows, "match")?.get(key).cloned())
    }

    fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        organization_id: Option<&OrganizationId>,
    ) -> Result<usize, RepositoryError> {
        let mut rows = lock(&self.rows, "match")?;
        let before = rows.len();
        rows.retain(|_, record| {
            let in_scope = organization_id.map_or(true, |org| &record.organization_id == org);
            !(in_scope && record.created_at < cutoff)
        });
        Ok(before - rows.len())
    }

    fn mark_notified(&self, key: &MatchKey, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows, "match")?;
        let record = rows.get_mut(key).ok_or(RepositoryError::NotFound)?;
        record.notified = true;
        record.notified_at = Some(at);
        Ok(())
    }

    fn records(
        &self,
        organization_id: Option<&OrganizationId>,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        let rows = lock(&self.rows, "match")?;
        Ok(rows
            .values()
            .filter(|record| organization_id.map_or(true, |org| &record.organization_id == org))
            .cloned()
            .collect())
    }
}
