//! Error types for Vigil Core.
//!
//! - [`ProbeError`]: failures the engine attaches to a single probe
//!   (deadline, cancellation, panic). Never escapes a check run.
//! - [`HealthError`]: failure of a whole check run. Only produced when the
//!   caller's context is already done before any probe could start.
//! - [`ConfigError`]: configuration loading and validation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// A specialized Result type for check runs.
pub type Result<T> = std::result::Result<T, HealthError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Probe Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure the engine records against a probe on its behalf.
///
/// Errors returned by the probe itself are reported verbatim and never
/// wrapped in this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The probe's context reached its deadline.
    #[error("context deadline exceeded after {}ms", .elapsed.as_millis())]
    DeadlineExceeded { elapsed: Duration },

    /// The probe's context was cancelled by the caller.
    #[error("context cancelled")]
    Cancelled,

    /// The probe panicked while running.
    #[error("probe panicked: {0}")]
    Panicked(String),

    /// The task running the probe was aborted by the runtime.
    #[error("probe task aborted")]
    Aborted,
}

impl ProbeError {
    /// Whether this error came from the context deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Check Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure of a whole check run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    /// The caller's context was cancelled before the check started.
    #[error("health check cancelled before any probe ran")]
    Cancelled,

    /// The caller's deadline had already passed when the check started.
    #[error("health check deadline exceeded before any probe ran")]
    DeadlineExceeded,
}

impl From<ProbeError> for HealthError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::DeadlineExceeded { .. } => Self::DeadlineExceeded,
            _ => Self::Cancelled,
        }
    }
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "unhealthy",
            "error": self.to_string(),
        });
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid probe `{name}`: {reason}")]
    InvalidProbe { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_probe(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProbe {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
