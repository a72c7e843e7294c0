//! Health check commands.
//!
//! Queries `/health/ready` or `/health/live` and displays per-probe status.

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, HealthBody};
use crate::output::{self, OutputFormat};

/// Which health contract to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Ready,
    Live,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Ready => "/health/ready",
            Endpoint::Live => "/health/live",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Endpoint::Ready => "Readiness",
            Endpoint::Live => "Liveness",
        }
    }
}

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Probe")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Error")]
    error: String,
}

fn rows(body: &HealthBody) -> Vec<ProbeRow> {
    body.checks
        .iter()
        .map(|(name, entry)| ProbeRow {
            name: name.clone(),
            status: entry.status.clone(),
            latency: format!("{}ms", entry.latency_ms),
            error: if entry.error.is_empty() {
                "-".to_string()
            } else {
                entry.error.clone()
            },
        })
        .collect()
}

/// Query the endpoint and print the result. Returns whether the server
/// accepted the probe.
pub async fn execute(endpoint: Endpoint, client: &ApiClient, format: OutputFormat) -> Result<bool> {
    let report = client.get_health(endpoint.path()).await?;
    let body = &report.body;

    match format {
        OutputFormat::Table => {
            output::print_header(endpoint.title());
            output::print_detail("Status", &output::colorize_status(&body.status).to_string());
            output::print_detail("API URL", client.base_url());
            if let Some(ts) = body.timestamp {
                output::print_detail("Timestamp", &ts.to_rfc3339());
            }
            if let Some(err) = &body.error {
                output::print_detail("Error", err);
            }
            println!();
            output::print_table(&rows(body));

            match (report.accepted, body.status.as_str()) {
                (true, "healthy") | (true, "alive") => {
                    output::print_success("All probes passing")
                }
                (true, status) => output::print_warning(&format!("Service is {}", status)),
                (false, status) => output::print_error(&format!("Service is {}", status)),
            }
        }
        _ => output::print_item(body, format)?,
    }

    Ok(report.accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ProbeEntry;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Ready.path(), "/health/ready");
        assert_eq!(Endpoint::Live.path(), "/health/live");
    }

    #[test]
    fn test_rows_fill_missing_error() {
        let mut body = HealthBody {
            status: "degraded".into(),
            timestamp: None,
            checks: Default::default(),
            error: None,
        };
        body.checks.insert(
            "db".into(),
            ProbeEntry {
                status: "healthy".into(),
                error: String::new(),
                latency_ms: 4,
            },
        );
        body.checks.insert(
            "cache".into(),
            ProbeEntry {
                status: "unhealthy".into(),
                error: "refused".into(),
                latency_ms: 12,
            },
        );

        let rows = rows(&body);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "cache");
        assert_eq!(rows[0].error, "refused");
        assert_eq!(rows[1].error, "-");
        assert_eq!(rows[1].latency, "4ms");
    }
}
