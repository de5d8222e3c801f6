use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{BuyerProfileId, OrganizationId, PropertyId};
use super::pipeline::MatchingError;
use super::recommend::SearchOverrides;
use super::service::{MatchingService, MatchingServiceError};

const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub(crate) struct TriggerRequest {
    pub(crate) organization_id: OrganizationId,
    #[serde(default)]
    pub(crate) property_id: Option<PropertyId>,
    #[serde(default)]
    pub(crate) buyer_profile_id: Option<BuyerProfileId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkRequest {
    pub(crate) organization_id: OrganizationId,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default)]
    pub(crate) organization_id: Option<OrganizationId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// Router exposing triggering, reconciliation, recommendations, search, and statistics.
pub fn matching_router(service: Arc<MatchingService>) -> Router {
    Router::new()
        .route("/api/v1/matching/trigger", post(trigger_handler))
        .route("/api/v1/matching/bulk", post(bulk_handler))
        .route("/api/v1/matching/stats", get(stats_handler))
        .route(
            "/api/v1/buyers/:buyer_profile_id/recommendations",
            get(recommend_handler),
        )
        .route("/api/v1/buyers/:buyer_profile_id/search", post(search_handler))
        .with_state(service)
}

pub(crate) async fn trigger_handler(
    State(service): State<Arc<MatchingService>>,
    Json(request): Json<TriggerRequest>,
) -> Response {
    let TriggerRequest {
        organization_id,
        property_id,
        buyer_profile_id,
    } = request;

    respond_blocking(move || match (property_id, buyer_profile_id) {
        (Some(_), Some(_)) => Err(MatchingServiceError::InvalidRequest(
            "provide either property_id or buyer_profile_id, not both".to_string(),
        )),
        (None, Some(buyer_id)) => service.match_buyer(&organization_id, &buyer_id),
        (property_id, None) => service.trigger_matching(&organization_id, property_id.as_ref()),
    })
    .await
}

pub(crate) async fn bulk_handler(
    State(service): State<Arc<MatchingService>>,
    Json(request): Json<BulkRequest>,
) -> Response {
    respond_blocking(move || service.bulk_match(&request.organization_id)).await
}

pub(crate) async fn stats_handler(
    State(service): State<Arc<MatchingService>>,
    Query(query): Query<StatsQuery>,
) -> Response {
    respond_blocking(move || service.get_stats(query.organization_id.as_ref())).await
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<MatchingService>>,
    Path(buyer_profile_id): Path<String>,
    Query(query): Query<RecommendQuery>,
) -> Response {
    let buyer_id = BuyerProfileId(buyer_profile_id);
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
    respond_blocking(move || service.recommend(&buyer_id, limit)).await
}

pub(crate) async fn search_handler(
    State(service): State<Arc<MatchingService>>,
    Path(buyer_profile_id): Path<String>,
    Json(overrides): Json<SearchOverrides>,
) -> Response {
    let buyer_id = BuyerProfileId(buyer_profile_id);
    respond_blocking(move || service.search(&buyer_id, &overrides)).await
}

/// Runs synchronous service work on the blocking pool and renders the outcome as JSON.
async fn respond_blocking<T, F>(work: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, MatchingServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(join_error) => worker_failure(join_error),
    }
}

pub(crate) fn error_status(err: &MatchingServiceError) -> StatusCode {
    match err {
        MatchingServiceError::InvalidRequest(_)
        | MatchingServiceError::Matching(MatchingError::OutsideOrganization { .. }) => {
            StatusCode::BAD_REQUEST
        }
        MatchingServiceError::Matching(
            MatchingError::PropertyNotFound(_) | MatchingError::BuyerNotFound(_),
        ) => StatusCode::NOT_FOUND,
        MatchingServiceError::Matching(
            MatchingError::WindowOutOfRange { .. } | MatchingError::Repository(_),
        ) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: MatchingServiceError) -> Response {
    let status = error_status(&err);
    if status.is_server_error() {
        error!(error = %err, "matching request failed");
    }
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

fn worker_failure(join_error: tokio::task::JoinError) -> Response {
    error!(error = %join_error, "matching worker did not complete");
    let payload = json!({ "error": "matching worker did not complete" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
