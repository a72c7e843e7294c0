//! Health check result types and status aggregation.
//!
//! This module provides:
//! - `HealthStatus` enum, the tri-state summary of a check run
//! - `ProbeStatus` enum, the binary outcome of a single probe
//! - `CheckResult` struct for one probe's outcome
//! - `AggregateResponse` struct for the body handed to transports
//! - `aggregate`, the severity-aware fold from results to status
//!
//! # Health Status Semantics
//!
//! - **Healthy**: every probe passed
//! - **Degraded**: only non-critical probes failed; still accepts traffic
//! - **Unhealthy**: at least one critical probe failed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::probe::Severity;

// ═══════════════════════════════════════════════════════════════════════════════
// Health Status
// ═══════════════════════════════════════════════════════════════════════════════

/// Overall status of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every probe passed
    Healthy,
    /// Only non-critical probes failed
    Degraded,
    /// At least one critical probe failed
    Unhealthy,
}

impl HealthStatus {
    /// Healthy or degraded: the instance should keep receiving traffic.
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Healthy => "All probes passed",
            Self::Degraded => "One or more non-critical probes failed",
            Self::Unhealthy => "One or more critical probes failed",
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::Healthy
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Probe Results
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Result of running one probe once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: ProbeStatus,

    /// Failure message; empty when healthy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    /// Time spent on the probe in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl CheckResult {
    pub fn healthy() -> Self {
        Self {
            status: ProbeStatus::Healthy,
            error: String::new(),
            latency_ms: 0,
        }
    }

    /// An unhealthy result. An empty message is replaced so failures are
    /// never reported without detail.
    pub fn unhealthy(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "probe failed without an error message".to_string();
        }
        Self {
            status: ProbeStatus::Unhealthy,
            error,
            latency_ms: 0,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = latency.as_millis() as u64;
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ProbeStatus::Healthy
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Aggregation
// ═══════════════════════════════════════════════════════════════════════════════

/// Fold per-probe results into an overall status.
///
/// Rules, first match wins:
/// 1. any critical probe unhealthy → `Unhealthy`
/// 2. any non-critical probe unhealthy → `Degraded`
/// 3. otherwise → `Healthy` (including no probes at all)
pub fn aggregate<'a, I>(results: I) -> HealthStatus
where
    I: IntoIterator<Item = (Severity, &'a CheckResult)>,
{
    let mut status = HealthStatus::Healthy;
    for (severity, result) in results {
        if result.is_healthy() {
            continue;
        }
        if severity.is_critical() {
            return HealthStatus::Unhealthy;
        }
        status = HealthStatus::Degraded;
    }
    status
}

// ═══════════════════════════════════════════════════════════════════════════════
// Aggregate Response
// ═══════════════════════════════════════════════════════════════════════════════

/// Body produced by one check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Overall status
    pub status: HealthStatus,

    /// When the check run finished
    pub timestamp: DateTime<Utc>,

    /// Per-probe results keyed by probe name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, CheckResult>,
}

impl AggregateResponse {
    /// Response for a registry with no probes.
    pub fn empty() -> Self {
        Self {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
            checks: BTreeMap::new(),
        }
    }

    /// Build a response from per-probe results and their severities.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (String, Severity, CheckResult)>,
    {
        let mut severities = BTreeMap::new();
        let mut checks = BTreeMap::new();
        for (name, severity, result) in results {
            severities.insert(name.clone(), severity);
            checks.insert(name, result);
        }

        let status = aggregate(
            checks
                .iter()
                .map(|(name, result)| (severities[name], result)),
        );

        Self {
            status,
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.status.is_operational()
    }

    /// Names of the probes that failed, in name order.
    pub fn failing(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|(_, r)| !r.is_healthy())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Default for AggregateResponse {
    fn default() -> Self {
        Self::empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
