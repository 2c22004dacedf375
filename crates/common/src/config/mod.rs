//! Configuration management for Cash Lens services
//!
//! Supports loading configuration from:
//! - Configuration files (config/default.toml, config/<APP_ENV>.toml, config/local.toml)
//! - Environment variables (prefixed with APP__)
//! - The conventional `DATABASE_URL` and `SENTRY_DSN` variables
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline applied to every request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Error telemetry DSN; telemetry is disabled when absent
    pub sentry_dsn: Option<String>,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name reported in logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 10 }
fn default_max_upload_bytes() -> usize { 16 * 1024 * 1024 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 0 }
fn default_service_name() -> String { "cash_lens_back".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            sentry_dsn: None,
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

/// Rewrite the legacy `postgres://` scheme to `postgresql://`.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{}", rest),
        None => url.to_string(),
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            // Conventional platform variables win over everything else
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("observability.sentry_dsn", std::env::var("SENTRY_DSN").ok())?

            .build()?;

        let mut config: Self = config.try_deserialize()?;
        config.database.url = normalize_database_url(&config.database.url);
        config.observability.sentry_dsn = config
            .observability
            .sentry_dsn
            .filter(|dsn| !dsn.trim().is_empty());
        Ok(config)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Whether error telemetry is configured
    pub fn telemetry_enabled(&self) -> bool {
        self.observability.sentry_dsn.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgresql://localhost/cashlens".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.telemetry_enabled());
    }

    #[test]
    fn test_postgres_scheme_rewritten() {
        assert_eq!(
            normalize_database_url("postgres://user:pw@db:5432/files"),
            "postgresql://user:pw@db:5432/files"
        );
        assert_eq!(
            normalize_database_url("postgresql://db/files"),
            "postgresql://db/files"
        );
        assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_sections_default_when_absent() {
        let config: AppConfig = Config::builder()
            .set_override("database.url", "sqlite::memory:")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.observability.service_name, "cash_lens_back");
        assert!(config.observability.sentry_dsn.is_none());
    }

    // Only test in the workspace that mutates process environment
    #[test]
    fn test_load_applies_platform_variables() {
        std::env::set_var("APP__DATABASE__URL", "postgresql://from-app-prefix/files");
        std::env::set_var("DATABASE_URL", "postgres://user:pw@db:5432/files");
        std::env::set_var("SENTRY_DSN", "   ");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.database.url, "postgresql://user:pw@db:5432/files");
        assert!(config.observability.sentry_dsn.is_none());
        assert!(!config.telemetry_enabled());

        std::env::set_var("SENTRY_DSN", "https://key@errors.example/1");
        let config = AppConfig::load().unwrap();
        assert_eq!(
            config.observability.sentry_dsn.as_deref(),
            Some("https://key@errors.example/1")
        );
        assert!(config.telemetry_enabled());

        std::env::remove_var("APP__DATABASE__URL");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("SENTRY_DSN");
    }
}
