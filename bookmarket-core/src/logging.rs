//! Logging setup
//!
//! Structured logging through `tracing`, configured from [`LoggingConfig`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            filter_directives: vec![
                "bookmarket_core=info".to_string(),
                "bookmarket_web=info".to_string(),
                "tower_http=info".to_string(),
                "sqlx=warn".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Same configuration at a different base level for our own crates
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self.filter_directives = self
            .filter_directives
            .into_iter()
            .map(|directive| match directive.split_once('=') {
                Some((target, _)) if target.starts_with("bookmarket") => {
                    format!("{}={}", target, level)
                }
                _ => directive,
            })
            .collect();
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let mut filter = EnvFilter::new(&self.level);
        for directive in &self.filter_directives {
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }
}

/// Initialize the logging system. `RUST_LOG` takes precedence over the
/// configured level and directives.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_file(config.include_location)
                    .with_line_number(config.include_location),
            )
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_level_rewrites_own_targets() {
        let config = LoggingConfig::default().with_level("debug");
        assert_eq!(config.level, "debug");
        assert!(config
            .filter_directives
            .contains(&"bookmarket_web=debug".to_string()));
        assert!(config.filter_directives.contains(&"sqlx=warn".to_string()));
    }

    #[test]
    fn test_default_directives_parse() {
        let config = LoggingConfig::default();
        for directive in &config.filter_directives {
            assert!(directive
                .parse::<tracing_subscriber::filter::Directive>()
                .is_ok());
        }
    }
}
