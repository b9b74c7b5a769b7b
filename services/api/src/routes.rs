use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use kua_workflow::workflows::marriage::{
    marriage_router, AdminOperations, ApplicationEventHandlers, IdentityProvider, LogStore,
    NotificationGateway, UserDirectory,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_marriage_routes<U, L, I, N>(
    handlers: Arc<ApplicationEventHandlers<U, L, N>>,
    admin: Arc<AdminOperations<U, L, I, N>>,
) -> axum::Router
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    marriage_router(handlers, admin)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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
