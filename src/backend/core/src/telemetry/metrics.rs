//! Prometheus metrics for health check runs.
//!
//! Metrics recorded by the health checker:
//!
//! - `health_checks_total{status}`: check runs by aggregate status
//! - `health_probe_results_total{probe, status}`: per-probe outcomes
//! - `health_check_duration_seconds`: wall time of a check run

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;
use std::collections::HashMap;

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    /// Histogram buckets for check durations (in seconds)
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Global labels to add to all metrics
    #[serde(default)]
    pub global_labels: HashMap<String, String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            duration_buckets: default_duration_buckets(),
            global_labels: HashMap::new(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_duration_buckets() -> Vec<f64> {
    vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
}

/// Handle to the installed Prometheus recorder.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    prometheus_handle: Option<PrometheusHandle>,
}

impl MetricsRegistry {
    /// A registry with no recorder behind it.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.prometheus_handle.is_some()
    }

    /// Render metrics in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.prometheus_handle
            .as_ref()
            .map(|h| h.render())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Install the global Prometheus recorder.
///
/// # Errors
///
/// Returns an error if the buckets are invalid or a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> anyhow::Result<MetricsRegistry> {
    if !config.enabled {
        return Ok(MetricsRegistry::disabled());
    }

    let mut builder = PrometheusBuilder::new();
    for (key, value) in &config.global_labels {
        builder = builder.add_global_label(key, value);
    }
    builder = builder.set_buckets(&config.duration_buckets)?;

    let handle = builder.install_recorder()?;
    register_metric_descriptions();

    tracing::info!("Metrics initialized");

    Ok(MetricsRegistry {
        prometheus_handle: Some(handle),
    })
}

fn register_metric_descriptions() {
    describe_counter!("health_checks_total", "Health check runs by aggregate status");
    describe_counter!(
        "health_probe_results_total",
        "Probe outcomes by probe name and status"
    );
    describe_histogram!(
        "health_check_duration_seconds",
        "Wall time of a health check run in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_defaults() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_disabled_registry_renders_nothing() {
        let registry = init_metrics(&MetricsConfig {
            enabled: false,
            ..Default::default()
        })
        .unwrap();
        assert!(!registry.is_enabled());
        assert!(registry.render().is_empty());
    }
}
