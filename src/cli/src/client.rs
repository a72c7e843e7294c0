//! HTTP client for communicating with the Vigil server.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Per-probe entry of a health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeEntry {
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default)]
    pub latency_ms: u64,
}

/// Body returned by the health endpoints, on 200 and 503 alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, ProbeEntry>,
    /// Set when the server could not run the check at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A health body together with the HTTP verdict.
#[derive(Debug)]
pub struct HealthReport {
    pub accepted: bool,
    pub body: HealthBody,
}

/// HTTP client for the Vigil API.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Return the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a health endpoint. A 503 carries a regular body and is not an error.
    pub async fn get_health(&self, path: &str) -> Result<HealthReport> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let body: HealthBody = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;

        Ok(HealthReport {
            accepted: status.is_success(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_health_body_deserialization() {
        let body: HealthBody = serde_json::from_str(
            r#"{
                "status": "degraded",
                "timestamp": "2024-01-01T00:00:00Z",
                "checks": {
                    "cache": {"status": "unhealthy", "error": "refused", "latency_ms": 3},
                    "db": {"status": "healthy", "latency_ms": 1}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.len(), 2);
        assert_eq!(body.checks["cache"].error, "refused");
        assert!(body.checks["db"].error.is_empty());
    }

    #[tokio::test]
    async fn test_get_health_accepts_503_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health/ready"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "status": "unhealthy",
                "checks": {"db": {"status": "unhealthy", "error": "down", "latency_ms": 2}}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let report = client.get_health("/health/ready").await.unwrap();

        assert!(!report.accepted);
        assert_eq!(report.body.status, "unhealthy");
        assert_eq!(report.body.checks["db"].error, "down");
    }

    #[tokio::test]
    async fn test_get_health_rejects_other_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.get_health("/health/ready").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
