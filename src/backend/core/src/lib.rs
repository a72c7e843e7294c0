//! # Vigil Core
//!
//! Concurrent health-check aggregation for REST services.
//!
//! ## Architecture
//!
//! - **Health**: probe registry, parallel execution engine, severity-aware
//!   aggregation, readiness and liveness contracts
//! - **API**: axum routes for the health contracts and Prometheus metrics
//! - **Telemetry**: structured logging and metrics
//! - **Config**: layered file and environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod telemetry;

pub use error::{ConfigError, HealthError, ProbeError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ConfigError, HealthError, ProbeError, Result};
    pub use crate::health::{
        aggregate, AggregateResponse, CheckResult, HealthChecker, HealthConfig, HealthStatus,
        HttpProbe, Probe, ProbeContext, ProbeOutcome, ProbeResponse, ProbeStatus, Severity,
        SharedHealthChecker, TcpProbe,
    };
}
