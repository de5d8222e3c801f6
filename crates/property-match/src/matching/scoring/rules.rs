use super::super::domain::{BuyerPreferences, Property, SpecPreference};
use super::distance::DistanceEstimator;
use super::{
    MatchCriterion, ScoreComponent, AMENITY_POINTS, AREA_POINTS, BATHROOM_POINTS, BEDROOM_POINTS,
    BUDGET_GRACE_POINTS, BUDGET_POINTS, FLOOR_POINTS, LOCATION_POINTS, NEARBY_LOCATION_POINTS,
};

/// Components for every criterion the property satisfied, in criterion order.
pub(crate) fn score_components(
    preferences: &BuyerPreferences,
    property: &Property,
    estimator: &dyn DistanceEstimator,
) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    if let Some(component) = location_component(preferences, property, estimator) {
        components.push(component);
    }
    if let Some(component) = budget_component(preferences, property) {
        components.push(component);
    }

    let specs = &preferences.specifications;
    let actual = &property.specifications;
    if let Some(component) = spec_component(
        specs.bedrooms.as_ref(),
        Some(actual.bedrooms),
        MatchCriterion::Bedrooms,
        BEDROOM_POINTS,
        |value| format!("{value} bedrooms as requested"),
    ) {
        components.push(component);
    }
    if let Some(component) = spec_component(
        specs.bathrooms.as_ref(),
        Some(actual.bathrooms),
        MatchCriterion::Bathrooms,
        BATHROOM_POINTS,
        |value| format!("{value} bathrooms as requested"),
    ) {
        components.push(component);
    }
    if let Some(component) = spec_component(
        specs.area_sqft.as_ref(),
        Some(actual.area_sqft),
        MatchCriterion::Area,
        AREA_POINTS,
        |value| format!("{value} sq ft fits your size range"),
    ) {
        components.push(component);
    }
    if let Some(component) = spec_component(
        specs.floor.as_ref(),
        actual.floor,
        MatchCriterion::Floor,
        FLOOR_POINTS,
        |value| format!("floor {value} matches your preference"),
    ) {
        components.push(component);
    }

    if let Some(component) = amenity_component(preferences, property) {
        components.push(component);
    }

    components
}

fn location_component(
    preferences: &BuyerPreferences,
    property: &Property,
    estimator: &dyn DistanceEstimator,
) -> Option<ScoreComponent> {
    let location = &property.location;
    let preferred = preferences
        .location
        .areas
        .iter()
        .find(|area| same_label(area, &location.area) || same_label(area, &location.city));

    if let Some(area) = preferred {
        return Some(ScoreComponent {
            criterion: MatchCriterion::Location,
            points: LOCATION_POINTS,
            note: format!("located in your preferred area {}", area.trim()),
        });
    }

    let radius = preferences.location.radius_km?;
    let distance = estimator.estimate_km(&preferences.location, location)?;
    if distance <= radius {
        Some(ScoreComponent {
            criterion: MatchCriterion::Location,
            points: NEARBY_LOCATION_POINTS,
            note: format!("within {radius:.0} km of your preferred location"),
        })
    } else {
        None
    }
}

fn budget_component(preferences: &BuyerPreferences, property: &Property) -> Option<ScoreComponent> {
    let budget = preferences.budget?;
    if budget.contains(property.price) {
        Some(ScoreComponent {
            criterion: MatchCriterion::Budget,
            points: BUDGET_POINTS,
            note: "price fits your budget".to_string(),
        })
    } else if budget.within_grace(property.price) {
        Some(ScoreComponent {
            criterion: MatchCriterion::Budget,
            points: BUDGET_GRACE_POINTS,
            note: "price slightly above your budget (within 10%)".to_string(),
        })
    } else {
        None
    }
}

fn spec_component<T, F>(
    preference: Option<&SpecPreference<T>>,
    actual: Option<T>,
    criterion: MatchCriterion,
    points: f64,
    note: F,
) -> Option<ScoreComponent>
where
    T: PartialOrd + Copy,
    F: FnOnce(T) -> String,
{
    let preference = preference?;
    let value = actual?;
    preference.accepts(value).then(|| ScoreComponent {
        criterion,
        points,
        note: note(value),
    })
}

fn amenity_component(
    preferences: &BuyerPreferences,
    property: &Property,
) -> Option<ScoreComponent> {
    let mut wished: Vec<&str> = Vec::new();
    for amenity in &preferences.amenities {
        let amenity = amenity.trim();
        if !amenity.is_empty() && !wished.iter().any(|seen| same_label(seen, amenity)) {
            wished.push(amenity);
        }
    }
    if wished.is_empty() {
        return None;
    }

    let matched: Vec<&str> = wished
        .iter()
        .copied()
        .filter(|amenity| {
            property
                .amenities
                .iter()
                .any(|offered| same_label(offered, amenity))
        })
        .collect();
    if matched.is_empty() {
        return None;
    }

    let points = matched.len() as f64 / wished.len() as f64 * AMENITY_POINTS;
    Some(ScoreComponent {
        criterion: MatchCriterion::Amenities,
        points,
        note: format!(
            "{} amenities you want: {}",
            matched.len(),
            matched.join(", ")
        ),
    })
}

fn same_label(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}
