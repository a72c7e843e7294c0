//! HTTP API for Vigil Core.
//!
//! - `GET /health`, `GET /health/ready`: readiness
//! - `GET /health/live`: liveness
//! - `GET /metrics`: Prometheus exposition

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::health::{self, HealthChecker, SharedHealthChecker};
use crate::telemetry::MetricsRegistry;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub checker: SharedHealthChecker,
    pub metrics: MetricsRegistry,
}

impl AppState {
    pub fn new(checker: HealthChecker, metrics: MetricsRegistry) -> Self {
        Self {
            checker: Arc::new(checker),
            metrics,
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let metrics = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(state.metrics);

    health::router(state.checker)
        .merge(metrics)
        .layer(TraceLayer::new_for_http())
}

/// GET /metrics - Prometheus metrics
pub async fn prometheus_metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        registry.render(),
    )
}
