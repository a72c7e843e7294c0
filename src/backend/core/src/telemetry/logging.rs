//! Structured logging with JSON/pretty/compact formats.
//!
//! - JSON format for production environments
//! - Pretty format for development
//! - Per-module log level configuration
//! - `RUST_LOG` takes precedence over the configured level when set

use serde::Deserialize;
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty or compact)
    #[serde(default)]
    pub format: LogFormat,

    /// Per-module log levels
    #[serde(default)]
    pub module_levels: HashMap<String, String>,

    /// Whether to include file/line information
    #[serde(default)]
    pub include_location: bool,

    /// Whether to include target (module path)
    #[serde(default = "default_include_target")]
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            module_levels: HashMap::new(),
            include_location: false,
            include_target: default_include_target(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format for production/structured logging
    #[default]
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact single-line format
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_include_target() -> bool {
    true
}

impl LoggingConfig {
    /// Build the filter from `RUST_LOG` or the configured levels.
    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut filter = EnvFilter::try_new(&self.level)?;
        for (module, level) in &self.module_levels {
            let directive = format!("{}={}", module, level);
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the level directives are invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = config.env_filter()?;

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.include_target);
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_module_level_is_rejected() {
        let mut config = LoggingConfig::default();
        config
            .module_levels
            .insert("vigil_core".to_string(), "not a level!".to_string());
        if std::env::var("RUST_LOG").is_err() {
            assert!(config.env_filter().is_err());
        }
    }
}
