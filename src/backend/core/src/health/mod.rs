//! Health Check System
//!
//! Runs a registry of named probes concurrently under a shared deadline,
//! folds their results into a healthy / degraded / unhealthy status and
//! exposes that status through readiness and liveness contracts.
//!
//! ```text
//! caller ──► HealthChecker::check ──► one task per probe ──► CheckResult
//!                                                              │
//!               readiness / liveness ◄── AggregateResponse ◄── aggregate
//! ```

mod builtin;
mod check;
mod checker;
mod context;
mod probe;
mod routes;

pub use builtin::*;
pub use check::*;
pub use checker::*;
pub use context::*;
pub use probe::*;
pub use routes::*;

use serde::Deserialize;
use std::time::Duration;

/// Health check configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthConfig {
    /// Deadline applied to every probe in a check run
    #[serde(with = "humantime_serde", default = "default_check_timeout")]
    pub check_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: default_check_timeout(),
        }
    }
}

fn default_check_timeout() -> Duration {
    Duration::from_secs(5)
}
