use axum::Router;

use sensorwatch_application::AppState;

use crate::handlers::{detect_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/detect/run",
            axum::routing::post(detect_handlers::run_detection),
        )
        .route(
            "/v1/detect/reports/last",
            axum::routing::get(detect_handlers::last_report),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
