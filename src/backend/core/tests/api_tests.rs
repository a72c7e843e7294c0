//! Tests for the HTTP surface.
//!
//! Tests cover:
//! - Readiness status codes for healthy, degraded and unhealthy services
//! - Liveness always answering 200
//! - Response body serialization
//! - Prometheus metrics endpoint
//! - Built-in HTTP probe against a mock server

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vigil_core::api::{build_router, AppState};
use vigil_core::prelude::*;
use vigil_core::telemetry::MetricsRegistry;

// ============================================================================
// Helpers
// ============================================================================

fn app(checker: HealthChecker) -> Router {
    build_router(AppState::new(checker, MetricsRegistry::disabled()))
}

fn checker_with(critical_ok: bool, non_critical_ok: bool) -> HealthChecker {
    let mut checker = HealthChecker::new();
    checker.add_check("db", move |_ctx: ProbeContext| async move {
        if critical_ok {
            anyhow::Ok(())
        } else {
            Err(anyhow::anyhow!("db unreachable"))
        }
    });
    checker.add_non_critical_check("cache", move |_ctx: ProbeContext| async move {
        if non_critical_ok {
            anyhow::Ok(())
        } else {
            Err(anyhow::anyhow!("cache unreachable"))
        }
    });
    checker
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Readiness
// ============================================================================

#[tokio::test]
async fn test_ready_healthy_returns_200() {
    let (status, body) = get(app(checker_with(true, true)), "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["db"]["status"], "healthy");
    assert!(body["checks"]["db"].get("error").is_none());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_ready_degraded_returns_200() {
    let (status, body) = get(app(checker_with(true, false)), "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["cache"]["status"], "unhealthy");
    assert_eq!(body["checks"]["cache"]["error"], "cache unreachable");
}

#[tokio::test]
async fn test_ready_unhealthy_returns_503() {
    let (status, body) = get(app(checker_with(false, true)), "/health/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["db"]["error"], "db unreachable");
}

#[tokio::test]
async fn test_health_alias_matches_ready() {
    let (status, body) = get(app(checker_with(false, false)), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_ready_without_probes_is_healthy() {
    let (status, body) = get(app(HealthChecker::new()), "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("checks").is_none());
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn test_live_unhealthy_still_returns_200() {
    let (status, body) = get(app(checker_with(false, false)), "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"].as_object().map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn test_live_healthy_returns_200() {
    let (status, body) = get(app(checker_with(true, true)), "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// ============================================================================
// Metrics and Routing
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint_disabled_is_empty() {
    let response = app(HealthChecker::new())
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(app(HealthChecker::new()), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Built-in HTTP Probe
// ============================================================================

#[tokio::test]
async fn test_http_probe_2xx_is_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut checker = HealthChecker::new();
    checker.add_check("upstream", HttpProbe::new(format!("{}/status", server.uri())));

    let response = checker.check(&ProbeContext::new()).await.unwrap();
    assert_eq!(response.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_http_probe_5xx_is_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut checker = HealthChecker::new();
    checker.add_non_critical_check("upstream", HttpProbe::new(format!("{}/status", server.uri())));

    let response = checker.check(&ProbeContext::new()).await.unwrap();
    assert_eq!(response.status, HealthStatus::Degraded);
    assert!(response.checks["upstream"].error.contains("500"));
}

#[tokio::test]
async fn test_http_probe_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut checker = HealthChecker::new().with_timeout(std::time::Duration::from_millis(100));
    checker.add_check("upstream", HttpProbe::new(server.uri()));

    let start = std::time::Instant::now();
    let response = checker.check(&ProbeContext::new()).await.unwrap();

    assert!(start.elapsed() < std::time::Duration::from_secs(3));
    assert_eq!(response.status, HealthStatus::Unhealthy);
}
