//! Telemetry: structured logging and Prometheus metrics.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil_core::telemetry::{init_telemetry, LoggingConfig, MetricsConfig};
//!
//! let metrics = init_telemetry(&LoggingConfig::default(), &MetricsConfig::default())
//!     .expect("Failed to initialize telemetry");
//! println!("{}", metrics.render());
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::{init_logging, LogFormat, LoggingConfig};
pub use self::metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Initialize logging, then metrics. Call once at startup.
pub fn init_telemetry(
    logging: &LoggingConfig,
    metrics: &MetricsConfig,
) -> anyhow::Result<MetricsRegistry> {
    init_logging(logging)?;
    init_metrics(metrics)
}
