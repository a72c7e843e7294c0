//! The probe abstraction.
//!
//! A probe is anything that can answer "is this dependency usable right now?"
//! given a [`ProbeContext`]. Async closures implement [`Probe`] directly:
//!
//! ```rust,ignore
//! checker.add_check("db", move |_ctx: ProbeContext| {
//!     let pool = pool.clone();
//!     async move {
//!         sqlx::query("SELECT 1").execute(&pool).await?;
//!         Ok(())
//!     }
//! });
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;

use super::context::ProbeContext;

/// Outcome returned by a probe. Any `Err` marks the probe unhealthy.
pub type ProbeOutcome = anyhow::Result<()>;

/// Trait for health probes.
///
/// `run` must not block the thread it is polled on. Wrap blocking clients in
/// [`tokio::task::spawn_blocking`] and await the handle; a probe that blocks
/// cannot be cut off at its deadline and stalls a current-thread runtime.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run the probe once. Implementations should stop work when `ctx` is done.
    async fn run(&self, ctx: ProbeContext) -> ProbeOutcome;
}

#[async_trait]
impl<F, Fut> Probe for F
where
    F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    async fn run(&self, ctx: ProbeContext) -> ProbeOutcome {
        (self)(ctx).await
    }
}

/// How much a probe's failure weighs in the aggregate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Failure makes the whole service unhealthy.
    Critical,
    /// Failure only degrades the service.
    NonCritical,
}

impl Severity {
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::NonCritical => write!(f, "non_critical"),
        }
    }
}
