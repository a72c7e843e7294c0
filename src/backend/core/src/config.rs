//! Configuration management.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::health::{HealthConfig, ProbeSpec};
use crate::telemetry::{LoggingConfig, MetricsConfig};

/// Environment variable naming an optional config file.
pub const CONFIG_PATH_ENV: &str = "VIGIL_CONFIG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Built-in probes to register at startup
    #[serde(default)]
    pub probes: Vec<ProbeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

impl Config {
    /// Load configuration from the environment, reading the file named by
    /// `VIGIL_CONFIG` first when it is set.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path),
            Err(_) => Self::build(None),
        }
    }

    /// Load from a specific file path, then apply environment overrides.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::build(Some(path))
    }

    fn build(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("VIGIL").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check probe specs and reject duplicate names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.probes {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::InvalidProbe {
                    name: spec.name.clone(),
                    reason: "duplicate probe name".to_string(),
                });
            }
        }
        Ok(())
    }
}
