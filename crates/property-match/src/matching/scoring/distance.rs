use super::super::domain::{LocationPreference, PropertyLocation};

/// Distance assumed between two different cities.
pub const NOMINAL_CROSS_CITY_KM: f64 = 10.0;

/// Coarse distance heuristic between a buyer's preferred location and a listing.
pub trait DistanceEstimator: Send + Sync {
    /// `None` when the preference carries no anchor to measure from.
    fn estimate_km(&self, preference: &LocationPreference, location: &PropertyLocation)
        -> Option<f64>;
}

/// Placeholder estimator: same city is 0 km, any other city is a fixed nominal distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CityDistanceEstimator;

impl DistanceEstimator for CityDistanceEstimator {
    fn estimate_km(
        &self,
        preference: &LocationPreference,
        location: &PropertyLocation,
    ) -> Option<f64> {
        let anchor = preference.city.as_deref()?;
        if anchor.trim().eq_ignore_ascii_case(location.city.trim()) {
            Some(0.0)
        } else {
            Some(NOMINAL_CROSS_CITY_KM)
        }
    }
}
