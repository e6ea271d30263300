use crate::infra::{AppState, InMemorySessionRepository};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use building_ops::config::ReportConfig;
use building_ops::error::AppError;
use building_ops::workflows::master_data::{export_template, MASTER_DATA_FILE_NAME};
use building_ops::workflows::session::{attachment_disposition, session_router};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_session_routes(
    repository: Arc<InMemorySessionRepository>,
    defaults: ReportConfig,
) -> axum::Router {
    session_router(repository, defaults)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/master-data/template",
            axum::routing::get(template_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn template_endpoint() -> Result<impl IntoResponse, AppError> {
    let workbook = export_template()?;
    let content_type = mime_guess::from_path(MASTER_DATA_FILE_NAME)
        .first_or_octet_stream()
        .to_string();
    let disposition = attachment_disposition(MASTER_DATA_FILE_NAME);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook,
    ))
}
