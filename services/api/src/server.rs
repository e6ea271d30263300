use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionRepository};
use crate::routes::with_session_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use building_ops::config::AppConfig;
use building_ops::error::AppError;
use building_ops::telemetry;
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

    let repository = Arc::new(InMemorySessionRepository::default());
    let app = with_session_routes(repository, config.report.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        community = %config.report.community_name,
        "building operations service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
