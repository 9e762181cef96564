//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Accrual authority and reconciliation configuration.
    pub accrual: AccrualConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind to (`host:port`).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86_400 // 24 hours
}

/// Accrual authority client and reconciliation loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// Base URL of the accrual authority (e.g. `http://localhost:8081`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Fixed interval between reconciliation cycles in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Maximum concurrent upstream lookups per cycle.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Backoff used when a 429 carries no usable `Retry-After`.
    #[serde(default = "default_retry_after")]
    pub default_retry_after_secs: u64,
    /// Age after which a still-open order is reported as stale.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,
}

impl AccrualConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Default rate-limit backoff as a `Duration`.
    #[must_use]
    pub const fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }

    /// Stale threshold as a `Duration`.
    #[must_use]
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    5
}

fn default_workers() -> usize {
    4
}

fn default_retry_after() -> u64 {
    60
}

fn default_stale_after() -> u64 {
    86_400
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// `LOYALTY__SECTION__KEY` variables, then the deployment variables
    /// `RUN_ADDRESS`, `DATABASE_URI` and `ACCRUAL_SYSTEM_ADDRESS`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LOYALTY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.address", std::env::var("RUN_ADDRESS").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URI").ok())?
            .set_override_option(
                "accrual.base_url",
                std::env::var("ACCRUAL_SYSTEM_ADDRESS").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_VARS: [(&str, Option<&str>); 5] = [
        ("LOYALTY__DATABASE__URL", Some("postgres://localhost/loyalty")),
        ("LOYALTY__JWT__SECRET", Some("secret")),
        ("LOYALTY__ACCRUAL__BASE_URL", Some("http://localhost:8081")),
        ("RUN_ADDRESS", None),
        ("DATABASE_URI", None),
    ];

    #[test]
    fn test_load_applies_defaults() {
        let vars = [&BASE_VARS[..], &[("ACCRUAL_SYSTEM_ADDRESS", None)]].concat();
        let config = temp_env::with_vars(vars, AppConfig::load).unwrap();

        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(config.database.url, "postgres://localhost/loyalty");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expiry_secs, 86_400);
        assert_eq!(config.accrual.base_url, "http://localhost:8081");
        assert_eq!(config.accrual.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.accrual.workers, 4);
        assert_eq!(config.accrual.default_retry_after(), Duration::from_secs(60));
    }

    #[test]
    fn test_deployment_variables_override_prefixed_ones() {
        let vars = [
            ("LOYALTY__DATABASE__URL", Some("postgres://localhost/loyalty")),
            ("LOYALTY__JWT__SECRET", Some("secret")),
            ("LOYALTY__ACCRUAL__BASE_URL", Some("http://localhost:8081")),
            ("LOYALTY__ACCRUAL__WORKERS", Some("2")),
            ("RUN_ADDRESS", Some("127.0.0.1:9000")),
            ("DATABASE_URI", Some("postgres://db/override")),
            ("ACCRUAL_SYSTEM_ADDRESS", Some("http://accrual:8080")),
        ];
        let config = temp_env::with_vars(vars, AppConfig::load).unwrap();

        assert_eq!(config.server.address, "127.0.0.1:9000");
        assert_eq!(config.database.url, "postgres://db/override");
        assert_eq!(config.accrual.base_url, "http://accrual:8080");
        assert_eq!(config.accrual.workers, 2);
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let vars = [
            ("LOYALTY__DATABASE__URL", None),
            ("DATABASE_URI", None),
            ("LOYALTY__JWT__SECRET", Some("secret")),
            ("LOYALTY__ACCRUAL__BASE_URL", Some("http://localhost:8081")),
        ];
        assert!(temp_env::with_vars(vars, AppConfig::load).is_err());
    }
}
