//! Weighted, additive scoring of a property against buyer preferences.
//!
//! Four independent buckets add up to at most 100 points: location (30), budget (25),
//! specifications (25, split 8/4/8/5) and amenities (20, prorated). Scoring is pure and
//! deterministic.

mod distance;
mod rules;

pub use distance::{CityDistanceEstimator, DistanceEstimator, NOMINAL_CROSS_CITY_KM};

use serde::{Deserialize, Serialize};

use super::domain::{BuyerPreferences, Property};

pub const LOCATION_POINTS: f64 = 30.0;
pub const NEARBY_LOCATION_POINTS: f64 = 20.0;
pub const BUDGET_POINTS: f64 = 25.0;
pub const BUDGET_GRACE_POINTS: f64 = 15.0;
pub const BEDROOM_POINTS: f64 = 8.0;
pub const BATHROOM_POINTS: f64 = 4.0;
pub const AREA_POINTS: f64 = 8.0;
pub const FLOOR_POINTS: f64 = 5.0;
pub const AMENITY_POINTS: f64 = 20.0;

/// Criteria a score component can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCriterion {
    Location,
    Budget,
    Bedrooms,
    Bathrooms,
    Area,
    Floor,
    Amenities,
}

/// Points awarded for one criterion together with the buyer-facing explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub criterion: MatchCriterion,
    pub points: f64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: u8,
    pub reasons: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl ScoreOutcome {
    pub fn points_for(&self, criterion: MatchCriterion) -> f64 {
        self.components
            .iter()
            .filter(|component| component.criterion == criterion)
            .map(|component| component.points)
            .sum()
    }
}

/// Scorer carrying the distance heuristic used for radius-based location credit.
pub struct PropertyScorer<E = CityDistanceEstimator> {
    estimator: E,
}

impl Default for PropertyScorer<CityDistanceEstimator> {
    fn default() -> Self {
        Self::new(CityDistanceEstimator)
    }
}

impl<E: DistanceEstimator> PropertyScorer<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    pub fn score(&self, preferences: &BuyerPreferences, property: &Property) -> ScoreOutcome {
        let components = rules::score_components(preferences, property, &self.estimator);
        let total: f64 = components.iter().map(|component| component.points).sum();
        let score = total.round().clamp(0.0, 100.0) as u8;

        let mut ranked: Vec<&ScoreComponent> = components.iter().collect();
        ranked.sort_by(|left, right| right.points.total_cmp(&left.points));
        let reasons = ranked
            .into_iter()
            .map(|component| component.note.clone())
            .collect();

        ScoreOutcome {
            score,
            reasons,
            components,
        }
    }
}

/// Score with the default city-based distance heuristic.
pub fn score_property(preferences: &BuyerPreferences, property: &Property) -> ScoreOutcome {
    PropertyScorer::<CityDistanceEstimator>::default().score(preferences, property)
}
