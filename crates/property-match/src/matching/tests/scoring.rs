use super::common::*;
use crate::matching::domain::{BuyerPreferences, LocationPreference, SpecPreference};
use crate::matching::scoring::{score_property, MatchCriterion, NOMINAL_CROSS_CITY_KM};

#[test]
fn reference_buyer_scores_location_budget_and_bedrooms() {
    let outcome = score_property(&bandra_preferences(), &bandra_property("p-1", 8_500_000));

    assert_eq!(outcome.score, 63);
    assert_eq!(outcome.points_for(MatchCriterion::Location), 30.0);
    assert_eq!(outcome.points_for(MatchCriterion::Budget), 25.0);
    assert_eq!(outcome.points_for(MatchCriterion::Bedrooms), 8.0);
    assert_eq!(
        outcome.reasons,
        vec![
            "located in your preferred area Bandra".to_string(),
            "price fits your budget".to_string(),
            "3 bedrooms as requested".to_string(),
        ]
    );
}

#[test]
fn price_beyond_grace_band_earns_no_budget_points() {
    let outcome = score_property(&bandra_preferences(), &bandra_property("p-1", 10_000_000));

    assert_eq!(outcome.score, 38);
    assert_eq!(outcome.points_for(MatchCriterion::Budget), 0.0);
    assert!(!outcome.reasons.iter().any(|reason| reason.contains("budget")));
}

#[test]
fn price_inside_grace_band_earns_partial_budget_points() {
    let outcome = score_property(&bandra_preferences(), &bandra_property("p-1", 9_500_000));

    assert_eq!(outcome.points_for(MatchCriterion::Budget), 15.0);
    assert_eq!(outcome.score, 53);
    assert!(outcome
        .reasons
        .iter()
        .any(|reason| reason.contains("slightly above")));
}

#[test]
fn radius_preference_awards_partial_location_credit() {
    let mut preferences = bandra_preferences();
    preferences.location = LocationPreference {
        areas: vec!["Juhu".to_string()],
        city: Some("Mumbai".to_string()),
        radius_km: Some(5.0),
    };

    let same_city = bandra_property("p-1", 8_500_000);
    let outcome = score_property(&preferences, &same_city);
    assert_eq!(outcome.points_for(MatchCriterion::Location), 20.0);

    let mut pune = bandra_property("p-2", 8_500_000);
    pune.location.city = "Pune".to_string();
    pune.location.area = "Baner".to_string();
    assert_eq!(
        score_property(&preferences, &pune).points_for(MatchCriterion::Location),
        0.0
    );

    preferences.location.radius_km = Some(NOMINAL_CROSS_CITY_KM + 2.0);
    assert_eq!(
        score_property(&preferences, &pune).points_for(MatchCriterion::Location),
        20.0
    );
}

#[test]
fn preferred_city_counts_as_preferred_area() {
    let mut preferences = bandra_preferences();
    preferences.location.areas = vec![" mumbai".to_string()];

    let outcome = score_property(&preferences, &bandra_property("p-1", 8_500_000));
    assert_eq!(outcome.points_for(MatchCriterion::Location), 30.0);
}

#[test]
fn all_specifications_and_amenities_reach_one_hundred() {
    let mut preferences = family_preferences();
    preferences.specifications.floor = Some(SpecPreference::Range {
        min: Some(2),
        max: None,
    });
    let mut property = bandra_property("p-1", 8_500_000);
    property.amenities = vec!["Gym".to_string(), "Pool".to_string(), "Parking".to_string()];

    let outcome = score_property(&preferences, &property);

    assert_eq!(outcome.score, 100);
    assert_eq!(outcome.points_for(MatchCriterion::Bathrooms), 4.0);
    assert_eq!(outcome.points_for(MatchCriterion::Area), 8.0);
    assert_eq!(outcome.points_for(MatchCriterion::Floor), 5.0);
    assert_eq!(outcome.points_for(MatchCriterion::Amenities), 20.0);
}

#[test]
fn floor_preference_needs_a_known_floor() {
    let mut preferences = bandra_preferences();
    preferences.specifications.floor = Some(SpecPreference::OneOf(vec![4]));
    let mut property = bandra_property("p-1", 8_500_000);
    property.specifications.floor = None;

    let outcome = score_property(&preferences, &property);
    assert_eq!(outcome.points_for(MatchCriterion::Floor), 0.0);
    assert_eq!(outcome.score, 63);
}

#[test]
fn amenity_points_are_prorated_and_rounded() {
    let mut preferences = bandra_preferences();
    preferences.amenities = vec!["gym".to_string(), "pool".to_string(), "lift".to_string()];
    let mut property = bandra_property("p-1", 8_500_000);
    property.amenities = vec!["GYM".to_string()];

    let outcome = score_property(&preferences, &property);

    let amenity_points = outcome.points_for(MatchCriterion::Amenities);
    assert!((amenity_points - 20.0 / 3.0).abs() < 1e-9);
    assert_eq!(outcome.score, 70);
    assert!(outcome
        .reasons
        .iter()
        .any(|reason| reason == "1 amenities you want: gym"));
}

#[test]
fn repeated_wishes_count_once() {
    let mut preferences = bandra_preferences();
    preferences.amenities = vec!["gym".to_string(), "Gym ".to_string()];
    let mut property = bandra_property("p-1", 8_500_000);
    property.amenities = vec!["gym".to_string()];

    let outcome = score_property(&preferences, &property);
    assert_eq!(outcome.points_for(MatchCriterion::Amenities), 20.0);
}

#[test]
fn empty_preferences_score_zero() {
    let outcome = score_property(
        &BuyerPreferences::default(),
        &bandra_property("p-1", 8_500_000),
    );
    assert_eq!(outcome.score, 0);
    assert!(outcome.reasons.is_empty());
    assert!(outcome.components.is_empty());
}

#[test]
fn adding_a_wished_amenity_never_lowers_the_score() {
    let preferences = family_preferences();
    let mut property = bandra_property("p-1", 8_500_000);
    property.amenities = vec!["sauna".to_string()];

    let mut previous = score_property(&preferences, &property).score;
    for amenity in ["gym", "pool"] {
        property.amenities.push(amenity.to_string());
        let next = score_property(&preferences, &property).score;
        assert!(next >= previous, "{amenity} lowered score {previous} -> {next}");
        previous = next;
    }
    assert_eq!(previous, 95);
}

#[test]
fn scores_stay_within_bounds_across_inputs() {
    let prices = [0, 4_000_000, 9_000_000, 9_900_000, 50_000_000];
    let bedroom_counts = [0u8, 2, 3, 9];
    let amenity_sets: [&[&str]; 3] = [&[], &["gym"], &["gym", "pool", "spa"]];

    for price in prices {
        for bedrooms in bedroom_counts {
            for amenities in amenity_sets {
                let mut property = bandra_property("p-1", price);
                property.specifications.bedrooms = bedrooms;
                property.amenities = amenities.iter().map(|a| a.to_string()).collect();

                let outcome = score_property(&family_preferences(), &property);
                assert!(outcome.score <= 100);
                let total: f64 = outcome.components.iter().map(|c| c.points).sum();
                assert!(total <= 100.0 + f64::EPSILON);
            }
        }
    }
}
