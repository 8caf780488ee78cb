//! Application configuration
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! then `BOOKMARKET__SECTION__KEY` environment variables.

use crate::error::{MarketError, MarketResult};
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "bookmarket.toml";
pub const ENV_PREFIX: &str = "BOOKMARKET";

/// Longest accepted session lifetime, one year
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

const DEV_SESSION_SECRET: &str = "bookmarket-dev-secret-change-in-production";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve templates and assets with development conveniences
    pub dev_mode: bool,
    /// Directory served under `/static`
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            static_dir: "bookmarket-web/static".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite:data/bookmarket.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/bookmarket.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC key for session tokens
    pub secret: String,
    /// Session lifetime
    pub ttl_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SESSION_SECRET.to_string(),
            ttl_hours: 24,
        }
    }
}

impl SessionConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEV_SESSION_SECRET
    }
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the environment
    pub fn load(path: Option<&Path>) -> MarketResult<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let config = Config::builder()
            .add_source(File::from(file).required(path.is_some()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MarketResult<()> {
        if self.session.secret.len() < 16 {
            return Err(MarketError::Config(
                "session.secret must be at least 16 bytes".to_string(),
            ));
        }
        if self.session.ttl_hours <= 0 {
            return Err(MarketError::Config(
                "session.ttl_hours must be positive".to_string(),
            ));
        }
        if self.session.ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(MarketError::Config(format!(
                "session.ttl_hours must be at most {}",
                MAX_SESSION_TTL_HOURS
            )));
        }
        if self.database.max_connections == 0 {
            return Err(MarketError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for tests: in-memory database, quiet logging
    pub fn for_testing() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: "bookmarket-test-secret-0123456789".to_string(),
                ttl_hours: 1,
            },
            ..Default::default()
        }
    }
}
