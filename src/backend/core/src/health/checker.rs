//! Probe registry and parallel execution engine.
//!
//! [`HealthChecker`] owns the named probes and the per-run timeout. Each call
//! to [`HealthChecker::check`] spawns one task per probe, bounds every probe by
//! the same deadline and waits for all of them before aggregating.
//!
//! # Abandoned probes
//!
//! Each probe task races the probe future against its context. An async probe
//! that ignores its context is dropped at the deadline, which stops it at its
//! next `.await`. A probe that blocks its worker thread cannot be preempted:
//! the engine stops waiting for that task shortly after the deadline and
//! detaches its join handle. The detached task runs until the blocking call
//! returns and its result is discarded. Repeatedly blocking probes therefore
//! pin runtime worker threads; keep blocking work in `spawn_blocking`.
//!
//! On a current-thread runtime nothing can run while a probe blocks the only
//! thread, so the whole check waits for the blocking call to return. The
//! probe is still reported unhealthy with a deadline error.

use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::check::{AggregateResponse, CheckResult, HealthStatus};
use super::context::ProbeContext;
use super::probe::{Probe, Severity};
use super::HealthConfig;
use crate::error::{ProbeError, Result};

/// How long past its deadline a probe task may take to report before the
/// engine detaches it.
const ABANDON_GRACE: Duration = Duration::from_millis(10);

struct RegisteredProbe {
    probe: Arc<dyn Probe>,
    severity: Severity,
}

/// Registry of named probes plus the engine that runs them.
pub struct HealthChecker {
    config: HealthConfig,
    probes: HashMap<String, RegisteredProbe>,
}

impl HealthChecker {
    /// Create a checker with the default configuration (5s timeout).
    pub fn new() -> Self {
        Self::with_config(HealthConfig::default())
    }

    pub fn with_config(config: HealthConfig) -> Self {
        Self {
            config,
            probes: HashMap::new(),
        }
    }

    /// Override the per-run timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.check_timeout = timeout;
        self
    }

    /// Register a critical probe. Re-using a name replaces the earlier probe.
    pub fn add_check(&mut self, name: impl Into<String>, probe: impl Probe + 'static) {
        self.register(name.into(), Arc::new(probe), Severity::Critical);
    }

    /// Register a non-critical probe. Its failure only degrades the status.
    pub fn add_non_critical_check(&mut self, name: impl Into<String>, probe: impl Probe + 'static) {
        self.register(name.into(), Arc::new(probe), Severity::NonCritical);
    }

    pub(crate) fn register(&mut self, name: String, probe: Arc<dyn Probe>, severity: Severity) {
        if self.probes.contains_key(&name) {
            warn!(probe = %name, "Replacing previously registered probe");
        }
        debug!(probe = %name, severity = %severity, "Registered probe");
        self.probes.insert(name, RegisteredProbe { probe, severity });
    }

    pub fn timeout(&self) -> Duration {
        self.config.check_timeout
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Registered probe names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.probes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn severity(&self, name: &str) -> Option<Severity> {
        self.probes.get(name).map(|p| p.severity)
    }

    /// Run every registered probe concurrently and aggregate the results.
    ///
    /// An empty registry is healthy without consulting `ctx`. Otherwise fails
    /// only when `ctx` is already cancelled or expired on entry. Probe
    /// failures, timeouts and panics are reported in the response.
    pub async fn check(&self, ctx: &ProbeContext) -> Result<AggregateResponse> {
        if self.probes.is_empty() {
            counter!("health_checks_total", "status" => HealthStatus::Healthy.to_string())
                .increment(1);
            return Ok(AggregateResponse::empty());
        }

        if let Some(err) = ctx.err() {
            warn!(error = %err, "Health check skipped, caller context already done");
            return Err(err.into());
        }

        let started = Instant::now();
        let run_ctx = ctx.child().with_timeout(self.config.check_timeout);

        let running: Vec<_> = self
            .probes
            .iter()
            .map(|(name, registered)| {
                let probe_ctx = run_ctx.child();
                let handle = tokio::spawn(run_probe(
                    Arc::clone(&registered.probe),
                    probe_ctx.clone(),
                ));
                (name.clone(), registered.severity, probe_ctx, handle)
            })
            .collect();

        let results = futures::future::join_all(running.into_iter().map(
            |(name, severity, probe_ctx, handle)| async move {
                let result = join_probe(&name, handle, &probe_ctx, started).await;
                (name, severity, result)
            },
        ))
        .await;

        // Releases any probe still holding a context clone.
        run_ctx.cancel();

        for (name, severity, result) in &results {
            counter!(
                "health_probe_results_total",
                "probe" => name.clone(),
                "status" => result.status.to_string()
            )
            .increment(1);

            if result.is_healthy() {
                debug!(probe = %name, latency_ms = result.latency_ms, "Probe healthy");
            } else {
                warn!(
                    probe = %name,
                    severity = %severity,
                    latency_ms = result.latency_ms,
                    error = %result.error,
                    "Probe unhealthy"
                );
            }
        }

        let response = AggregateResponse::from_results(results);
        let elapsed = started.elapsed();

        counter!("health_checks_total", "status" => response.status.to_string()).increment(1);
        histogram!("health_check_duration_seconds").record(elapsed.as_secs_f64());

        match response.status {
            HealthStatus::Healthy => debug!(
                probes = response.checks.len(),
                duration_ms = elapsed.as_millis() as u64,
                "Health check completed"
            ),
            status => info!(
                status = %status,
                summary = status.description(),
                failing = ?response.failing(),
                duration_ms = elapsed.as_millis() as u64,
                "Health check completed with failures"
            ),
        }

        Ok(response)
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("config", &self.config)
            .field("probes", &self.names())
            .finish()
    }
}

/// Body of the task spawned for one probe.
async fn run_probe(probe: Arc<dyn Probe>, ctx: ProbeContext) -> CheckResult {
    let start = Instant::now();

    let outcome = tokio::select! {
        biased;
        outcome = probe.run(ctx.clone()) => outcome.map_err(|e| format!("{:#}", e)),
        err = ctx.done() => Err(err.to_string()),
    };

    // A probe that blocked its thread past the deadline only reports once it
    // returns; whatever it returned, it ran out of time.
    let outcome = match ctx.err() {
        Some(err) => Err(err.to_string()),
        None => outcome,
    };

    match outcome {
        Ok(()) => CheckResult::healthy(),
        Err(message) => CheckResult::unhealthy(message),
    }
    .with_latency(start.elapsed())
}

/// Wait for a probe task, giving up once its context is done.
async fn join_probe(
    name: &str,
    mut handle: JoinHandle<CheckResult>,
    ctx: &ProbeContext,
    started: Instant,
) -> CheckResult {
    tokio::select! {
        biased;
        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(err) => CheckResult::unhealthy(join_error(err).to_string())
                .with_latency(started.elapsed()),
        },
        err = abandon_after(ctx) => {
            // The join handle is dropped on return, which detaches the task.
            warn!(probe = %name, "Probe did not yield after its deadline, detaching task");
            CheckResult::unhealthy(err.to_string()).with_latency(started.elapsed())
        }
    }
}

async fn abandon_after(ctx: &ProbeContext) -> ProbeError {
    let err = ctx.done().await;
    tokio::time::sleep(ABANDON_GRACE).await;
    err
}

fn join_error(err: JoinError) -> ProbeError {
    if !err.is_panic() {
        return ProbeError::Aborted;
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    ProbeError::Panicked(message)
}
