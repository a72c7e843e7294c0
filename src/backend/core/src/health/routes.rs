//! Readiness and liveness contracts plus their HTTP routes.
//!
//! Both contracts run a full check. Readiness turns the aggregate status into
//! accept (healthy, degraded) or reject (unhealthy); liveness always accepts
//! and only carries the probe results for diagnostics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::{AggregateResponse, HealthChecker, ProbeContext};
use crate::error::Result;

/// Shared health checker state
pub type SharedHealthChecker = Arc<HealthChecker>;

/// Result of a readiness or liveness invocation.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// Whether the transport should report success
    pub accepted: bool,
    /// Aggregate check results
    pub body: AggregateResponse,
}

impl ProbeResponse {
    /// Whether the wrapping transport operation should signal failure.
    pub fn failed(&self) -> bool {
        !self.accepted
    }

    pub fn status_code(&self) -> StatusCode {
        if self.accepted {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for ProbeResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body)).into_response()
    }
}

impl HealthChecker {
    /// Should traffic be routed here? Degraded still accepts.
    pub async fn readiness(&self, ctx: &ProbeContext) -> Result<ProbeResponse> {
        let body = self.check(ctx).await?;
        Ok(ProbeResponse {
            accepted: body.is_operational(),
            body,
        })
    }

    /// Is the process alive? Always accepts regardless of probe outcomes.
    pub async fn liveness(&self, ctx: &ProbeContext) -> Result<ProbeResponse> {
        let body = self.check(ctx).await?;
        Ok(ProbeResponse {
            accepted: true,
            body,
        })
    }
}

/// Build the health routes.
///
/// - `GET /health` and `GET /health/ready`: readiness
/// - `GET /health/live`: liveness
pub fn router(checker: SharedHealthChecker) -> Router {
    Router::new()
        .route("/health", get(readiness_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .with_state(checker)
}

/// GET /health/ready - Readiness probe for load balancers
pub async fn readiness_check(State(checker): State<SharedHealthChecker>) -> Response {
    let ctx = ProbeContext::new();
    // Cancel in-flight probes if the client goes away.
    let _guard = ctx.token().clone().drop_guard();

    match checker.readiness(&ctx).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /health/live - Liveness probe for container orchestrators
pub async fn liveness_check(State(checker): State<SharedHealthChecker>) -> Response {
    let ctx = ProbeContext::new();
    let _guard = ctx.token().clone().drop_guard();

    match checker.liveness(&ctx).await {
        Ok(response) => response.into_response(),
        Err(err) => (
            StatusCode::OK,
            Json(json!({ "status": "alive", "error": err.to_string() })),
        )
            .into_response(),
    }
}
