use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Tenant partition every property and buyer profile belongs to.
    OrganizationId
);
string_id!(PropertyId);
string_id!(BuyerProfileId);
string_id!(
    /// Reference to the CRM contact behind a buyer profile.
    ContactId
);

/// Listing availability. Only `Available` listings take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Sold,
    Blocked,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Blocked => "blocked",
        }
    }

    pub const fn is_matchable(self) -> bool {
        matches!(self, PropertyStatus::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyLocation {
    pub area: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PropertyLocation {
    pub fn display(&self) -> String {
        format!("{}, {}", self.area, self.city)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpecifications {
    pub bedrooms: u8,
    pub bathrooms: u8,
    pub area_sqft: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i16>,
}

impl PropertySpecifications {
    /// One-line summary used in notification text.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} BHK | {} bath | {} sq ft",
            self.bedrooms, self.bathrooms, self.area_sqft
        );
        if let Some(floor) = self.floor {
            summary.push_str(&format!(" | floor {floor}"));
        }
        summary
    }
}

/// Listing snapshot supplied by the listing-management collaborator. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub status: PropertyStatus,
    pub location: PropertyLocation,
    pub price: u64,
    pub currency: String,
    pub specifications: PropertySpecifications,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn price_label(&self) -> String {
        format!("{} {}", self.currency, group_thousands(self.price))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Either a discrete set of acceptable values or an inclusive range with optional ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecPreference<T> {
    OneOf(Vec<T>),
    Range {
        #[serde(default)]
        min: Option<T>,
        #[serde(default)]
        max: Option<T>,
    },
}

impl<T: PartialOrd + Copy> SpecPreference<T> {
    pub fn accepts(&self, value: T) -> bool {
        match self {
            SpecPreference::OneOf(values) => values.iter().any(|candidate| *candidate == value),
            SpecPreference::Range { min, max } => {
                min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    #[serde(default)]
    pub areas: Vec<String>,
    /// Anchor city the search radius is measured from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u64,
    pub max: u64,
}

impl BudgetRange {
    pub fn contains(&self, price: u64) -> bool {
        price >= self.min && price <= self.max
    }

    /// True when the price exceeds `max` by no more than 10%.
    pub fn within_grace(&self, price: u64) -> bool {
        price > self.max && u128::from(price) * 10 <= u128::from(self.max) * 11
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<SpecPreference<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<SpecPreference<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<SpecPreference<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<SpecPreference<i16>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerPreferences {
    #[serde(default)]
    pub location: LocationPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRange>,
    #[serde(default)]
    pub specifications: SpecificationPreferences,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Buyer profile supplied by the CRM collaborator. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub id: BuyerProfileId,
    pub organization_id: OrganizationId,
    pub contact_id: ContactId,
    pub preferences: BuyerPreferences,
    pub engagement_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
}

/// Natural key of a persisted match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub property_id: PropertyId,
    pub buyer_profile_id: BuyerProfileId,
}

impl MatchKey {
    pub fn new(property_id: PropertyId, buyer_profile_id: BuyerProfileId) -> Self {
        Self {
            property_id,
            buyer_profile_id,
        }
    }
}

/// Persisted match row. `created_at` is refreshed on every rescoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub key: MatchKey,
    pub organization_id: OrganizationId,
    pub match_score: u8,
    pub match_reasons: Vec<String>,
    pub notified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn top_reasons(&self, count: usize) -> &[String] {
        let end = self.match_reasons.len().min(count);
        &self.match_reasons[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_preference_handles_sets_and_open_ranges() {
        let set = SpecPreference::OneOf(vec![2u8, 3]);
        assert!(set.accepts(3));
        assert!(!set.accepts(4));

        let floor = SpecPreference::Range {
            min: Some(2i16),
            max: None,
        };
        assert!(floor.accepts(14));
        assert!(!floor.accepts(1));
    }

    #[test]
    fn budget_grace_band_stops_at_ten_percent() {
        let budget = BudgetRange {
            min: 5_000_000,
            max: 9_000_000,
        };
        assert!(budget.contains(8_500_000));
        assert!(budget.within_grace(9_900_000));
        assert!(!budget.within_grace(10_000_000));
        assert!(!budget.within_grace(8_000_000));
    }

    #[test]
    fn price_label_groups_digits() {
        assert_eq!(group_thousands(8_500_000), "8,500,000");
        assert_eq!(group_thousands(950), "950");
    }

    #[test]
    fn spec_preference_deserializes_tagged_json() {
        let parsed: SpecPreference<u8> =
            serde_json::from_str(r#"{"one_of":[2,3]}"#).expect("set parses");
        assert_eq!(parsed, SpecPreference::OneOf(vec![2, 3]));

        let parsed: SpecPreference<u32> =
            serde_json::from_str(r#"{"range":{"min":900}}"#).expect("range parses");
        assert_eq!(
            parsed,
            SpecPreference::Range {
                min: Some(900),
                max: None
            }
        );
    }
}
