//! Built-in probes and configuration-driven registration.
//!
//! - **TCP**: connection establishment to `host:port`
//! - **HTTP**: `GET` against a URL, healthy on any 2xx
//!
//! Both honour the probe context: the remaining time before the deadline is
//! used as the I/O timeout.

use anyhow::{bail, Context as _};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

use super::{HealthChecker, HealthConfig, Probe, ProbeContext, ProbeOutcome, Severity};
use crate::error::ConfigError;

// ═══════════════════════════════════════════════════════════════════════════════
// TCP Probe
// ═══════════════════════════════════════════════════════════════════════════════

/// Probe that succeeds when a TCP connection can be established.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
}

impl TcpProbe {
    /// Create a probe for `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn run(&self, ctx: ProbeContext) -> ProbeOutcome {
        debug!(address = %self.address, "TCP probe connecting");

        let connect = TcpStream::connect(&self.address);
        let _stream = match ctx.remaining() {
            Some(remaining) => tokio::time::timeout(remaining, connect)
                .await
                .map_err(|_| anyhow::anyhow!("connect to {} timed out", self.address))?,
            None => connect.await,
        }
        .with_context(|| format!("connect to {} failed", self.address))?;

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HTTP Probe
// ═══════════════════════════════════════════════════════════════════════════════

/// Probe that succeeds when a `GET` returns a 2xx status.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Use a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn run(&self, ctx: ProbeContext) -> ProbeOutcome {
        let mut request = self.client.get(&self.url);
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;

        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "HTTP probe response");

        if !status.is_success() {
            bail!("GET {} returned {}", self.url, status);
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind of built-in probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Tcp,
    Http,
}

/// A probe described in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeSpec {
    pub name: String,
    pub kind: ProbeKind,
    /// `host:port` for TCP, URL for HTTP
    pub target: String,
    #[serde(default = "default_critical")]
    pub critical: bool,
}

fn default_critical() -> bool {
    true
}

impl ProbeSpec {
    pub fn severity(&self) -> Severity {
        if self.critical {
            Severity::Critical
        } else {
            Severity::NonCritical
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_probe(&self.name, "name must not be empty"));
        }
        if self.target.trim().is_empty() {
            return Err(ConfigError::invalid_probe(&self.name, "target must not be empty"));
        }
        match self.kind {
            ProbeKind::Tcp if !self.target.contains(':') => Err(ConfigError::invalid_probe(
                &self.name,
                format!("tcp target `{}` must be host:port", self.target),
            )),
            ProbeKind::Http
                if !(self.target.starts_with("http://") || self.target.starts_with("https://")) =>
            {
                Err(ConfigError::invalid_probe(
                    &self.name,
                    format!("http target `{}` must be an http(s) URL", self.target),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl HealthChecker {
    /// Build a checker and register the configured built-in probes.
    pub fn from_probe_specs(config: HealthConfig, specs: &[ProbeSpec]) -> Result<Self, ConfigError> {
        let mut checker = Self::with_config(config);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| ConfigError::invalid_probe("http", e.to_string()))?;

        for spec in specs {
            spec.validate()?;
            let probe: std::sync::Arc<dyn Probe> = match spec.kind {
                ProbeKind::Tcp => std::sync::Arc::new(TcpProbe::new(&spec.target)),
                ProbeKind::Http => {
                    std::sync::Arc::new(HttpProbe::new(&spec.target).with_client(client.clone()))
                }
            };
            checker.register(spec.name.clone(), probe, spec.severity());
        }
        Ok(checker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeStatus;
    use tokio::net::TcpListener;

    fn spec(kind: ProbeKind, target: &str) -> ProbeSpec {
        ProbeSpec {
            name: "dep".to_string(),
            kind,
            target: target.to_string(),
            critical: true,
        }
    }

    #[tokio::test]
    async fn test_tcp_probe_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::new(addr.to_string());
        let ctx = ProbeContext::new().with_timeout(Duration::from_secs(2));
        assert!(probe.run(ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_tcp_probe_against_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = TcpProbe::new(addr.to_string());
        let ctx = ProbeContext::new().with_timeout(Duration::from_secs(2));
        let err = probe.run(ctx).await.unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[test]
    fn test_spec_validation() {
        assert!(spec(ProbeKind::Tcp, "127.0.0.1:5432").validate().is_ok());
        assert!(spec(ProbeKind::Tcp, "localhost").validate().is_err());
        assert!(spec(ProbeKind::Http, "http://localhost/health").validate().is_ok());
        assert!(spec(ProbeKind::Http, "localhost/health").validate().is_err());
        assert!(spec(ProbeKind::Tcp, "").validate().is_err());
    }

    #[test]
    fn test_spec_deserialize_defaults_to_critical() {
        let spec: ProbeSpec = serde_json::from_str(
            r#"{"name": "db", "kind": "tcp", "target": "127.0.0.1:5432"}"#,
        )
        .unwrap();
        assert!(spec.critical);
        assert_eq!(spec.severity(), Severity::Critical);
    }

    #[tokio::test]
    async fn test_from_probe_specs_registers_all() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let specs = vec![
            ProbeSpec {
                name: "db".to_string(),
                kind: ProbeKind::Tcp,
                target: addr.to_string(),
                critical: true,
            },
            ProbeSpec {
                name: "search".to_string(),
                kind: ProbeKind::Http,
                target: "http://127.0.0.1:9/health".to_string(),
                critical: false,
            },
        ];

        let checker = HealthChecker::from_probe_specs(HealthConfig::default(), &specs).unwrap();
        assert_eq!(checker.names(), vec!["db", "search"]);
        assert_eq!(checker.severity("search"), Some(Severity::NonCritical));

        let response = checker.check(&ProbeContext::new()).await.unwrap();
        assert_eq!(response.checks["db"].status, ProbeStatus::Healthy);
        assert_eq!(response.checks["search"].status, ProbeStatus::Unhealthy);
    }

    #[test]
    fn test_from_probe_specs_rejects_invalid() {
        let specs = vec![spec(ProbeKind::Http, "not-a-url")];
        let err = HealthChecker::from_probe_specs(HealthConfig::default(), &specs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProbe { .. }));
    }
}
