use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde_json::json;
use sponsor_tracker::auth::TokenKeys;
use sponsor_tracker::workflows::applications::{
    application_router, ApplicationRepository, TrackerService,
};
use sponsor_tracker::workflows::sponsors::{company_router, CompanyDirectory};
use std::sync::Arc;

pub(crate) fn with_tracker_routes<C, R>(
    tracker: Arc<TrackerService<C, R>>,
    directory: Arc<C>,
    tokens: Arc<TokenKeys>,
    expose_errors: bool,
) -> Router
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    application_router(tracker, tokens, expose_errors)
        .merge(company_router(directory, expose_errors))
        .route("/", get(banner))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn banner() -> Json<serde_json::Value> {
    Json(json!({
        "status": "Sponsor tracker API running",
        "timestamp": Utc::now(),
    }))
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
