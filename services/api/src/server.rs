use crate::cli::ServeArgs;
use crate::infra::{in_memory_matching, repository_error, seed_demo_catalog, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use property_match::config::AppConfig;
use property_match::error::AppError;
use property_match::matching::OrganizationId;
use property_match::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let matching = in_memory_matching(config.matching.clone());
    if let Some(organization) = args.seed_organization.take() {
        let organization_id = OrganizationId::new(organization);
        seed_demo_catalog(&matching.catalog, &organization_id, Utc::now())
            .map_err(repository_error)?;
        info!(%organization_id, "demo catalog seeded");
    }

    let app = with_matching_routes(matching.service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        auto_match_threshold = config.matching.auto_match_threshold,
        "property matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
