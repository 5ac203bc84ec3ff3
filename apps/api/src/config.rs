//! API server configuration.
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. optional `teknoroma.toml` in the working directory
//! 3. `TEKNOROMA_*` environment variables (`TEKNOROMA_PORT=9000`)

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// How long a write waits for another writer's lock, in milliseconds
    pub busy_timeout_ms: u64,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Buffered events per notification subscriber before it starts lagging
    pub notification_capacity: usize,

    /// Exchange-rate cache lifetime for today's rates, in seconds
    pub rate_cache_today_secs: u64,

    /// Exchange-rate cache lifetime for past dates, in seconds
    pub rate_cache_history_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: "./teknoroma.db".to_string(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            log_level: "info".to_string(),
            notification_capacity: 256,
            rate_cache_today_secs: 60 * 60,
            rate_cache_history_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl AppConfig {
    /// Loads configuration from defaults, `teknoroma.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let config: AppConfig = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port as i64)?
            .set_default("database_path", defaults.database_path)?
            .set_default("max_connections", defaults.max_connections as i64)?
            .set_default("busy_timeout_ms", defaults.busy_timeout_ms as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("notification_capacity", defaults.notification_capacity as i64)?
            .set_default("rate_cache_today_secs", defaults.rate_cache_today_secs as i64)?
            .set_default("rate_cache_history_secs", defaults.rate_cache_history_secs as i64)?
            .add_source(File::with_name("teknoroma").required(false))
            .add_source(Environment::with_prefix("TEKNOROMA").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::InvalidValue("notification_capacity".to_string()));
        }
        Ok(())
    }

    /// Returns the `"host:port"` bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// `(today, history)` exchange-rate cache lifetimes.
    pub fn rate_cache_ttls(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.rate_cache_today_secs),
            Duration::from_secs(self.rate_cache_history_secs),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.rate_cache_ttls(),
            (crate::services::exchange_rate::TODAY_TTL, crate::services::exchange_rate::HISTORY_TTL)
        );
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = AppConfig {
            max_connections: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(f)) if f == "max_connections"));

        let config = AppConfig {
            database_path: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));
    }
}
