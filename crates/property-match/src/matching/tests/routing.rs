use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::matching::recommend::SearchOverrides;
use crate::matching::router::{
    matching_router, recommend_handler, search_handler, stats_handler, RecommendQuery,
    StatsQuery,
};

fn populated_router() -> (axum::Router, Harness) {
    let harness = harness();
    let mut top = bandra_property("p-top", 8_500_000);
    top.amenities = vec!["gym".to_string(), "pool".to_string()];
    harness.add_property(top);
    harness.add_buyer(buyer("b-fam", family_preferences()));
    (matching_router(harness.service.clone()), harness)
}

fn json_request(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn trigger_route_persists_and_reports_matches() {
    let (router, harness) = populated_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/matching/trigger",
            json!({ "organization_id": "org-mumbai", "property_id": "p-top" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["matches_created"], 1);
    assert_eq!(payload["matches"][0]["match_score"], 95);
    assert_eq!(payload["notifications"]["sent"], 1);
    assert!(harness.stored("p-top", "b-fam").is_some());
}

#[tokio::test]
async fn trigger_route_rejects_two_triggers() {
    let (router, _harness) = populated_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/matching/trigger",
            json!({
                "organization_id": "org-mumbai",
                "property_id": "p-top",
                "buyer_profile_id": "b-fam"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trigger_route_returns_not_found_for_unknown_property() {
    let (router, _harness) = populated_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/matching/trigger",
            json!({ "organization_id": "org-mumbai", "property_id": "p-missing" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("p-missing"));
}

#[tokio::test]
async fn bulk_route_returns_throughput_report() {
    let (router, _harness) = populated_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/matching/bulk",
            json!({ "organization_id": "org-mumbai" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["organization_id"], "org-mumbai");
    assert_eq!(payload["matches_created"], 1);
    assert!(payload.get("matches_per_second").is_some());
}

#[tokio::test]
async fn recommendations_route_applies_limit_query() {
    let (router, _harness) = populated_router();

    let response = router
        .oneshot(
            Request::get("/api/v1/buyers/b-fam/recommendations?limit=3")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let ranked = payload.as_array().expect("array payload");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0]["property"]["id"], "p-top");
    assert_eq!(ranked[0]["score"], 95);
}

#[tokio::test]
async fn search_route_accepts_overrides() {
    let (router, _harness) = populated_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/buyers/b-fam/search",
            json!({ "max_price": 20000000, "areas": ["Bandra", "Andheri"] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().expect("array payload").len(), 1);
}

#[tokio::test]
async fn recommend_handler_maps_missing_buyer_to_not_found() {
    let harness = harness();
    let response = recommend_handler(
        State(harness.service.clone()),
        Path("b-ghost".to_string()),
        Query(RecommendQuery { limit: None }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_handler_reports_empty_store() {
    let harness = harness();
    let response = stats_handler(
        State(harness.service.clone()),
        Query(StatsQuery {
            organization_id: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_matches"], 0);
    assert_eq!(payload["average_notification_latency_seconds"], serde_json::Value::Null);
}

#[tokio::test]
async fn search_handler_rejects_inverted_price_range() {
    let (_router, harness) = populated_router();
    let response = search_handler(
        State(harness.service.clone()),
        Path("b-fam".to_string()),
        Json(SearchOverrides {
            min_price: Some(9_000_000),
            max_price: Some(1_000_000),
            ..SearchOverrides::default()
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("min_price"));
}
