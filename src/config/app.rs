//! Main application configuration
//!
//! This module defines the primary configuration structures for the courtside
//! notification service, including environment variable loading, optional TOML
//! file loading, and validation.

use crate::config::payment::PaymentConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub gateway: GatewaySettings,
    pub payment: PaymentConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the public gateway (websocket + ingress + admin)
    pub http_port: u16,
    /// Port for health check and metrics endpoints
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Gateway and channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Front-end origin allowed to connect (CORS and websocket upgrades)
    pub allowed_origin: String,
    /// Buffered frames per tenant channel before slow subscribers lag
    pub channel_capacity: usize,
    /// Idle channel sweep interval in seconds
    pub sweep_interval_seconds: u64,
    /// Channel statistics refresh interval in seconds
    pub stats_interval_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            gateway: GatewaySettings::default(),
            payment: PaymentConfig::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "courtside".to_string(),
            log_level: "info".to_string(),
            http_port: 8080,
            metrics_port: 9090,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_string(),
            channel_capacity: 256,
            sweep_interval_seconds: 60, // 1 minute
            stats_interval_seconds: 15,
        }
    }
}

/// Sections loadable from a TOML file; the payment namespace always comes
/// from the environment.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(default)]
    service: ServiceSettings,
    #[serde(default)]
    gateway: GatewaySettings,
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.payment = PaymentConfig::from_env();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            config.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(port) = env::var("METRICS_PORT") {
            config.service.metrics_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid METRICS_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Gateway settings; the allowed origin is the configured front-end URL
        if let Ok(origin) = env::var("FRONTEND_URL") {
            if !origin.is_empty() {
                config.gateway.allowed_origin = origin;
            }
        }
        if let Ok(capacity) = env::var("GATEWAY_CHANNEL_CAPACITY") {
            config.gateway.channel_capacity = capacity
                .parse()
                .map_err(|_| anyhow!("Invalid GATEWAY_CHANNEL_CAPACITY value: {}", capacity))?;
        }
        if let Ok(sweep) = env::var("GATEWAY_SWEEP_INTERVAL_SECONDS") {
            config.gateway.sweep_interval_seconds = sweep.parse().map_err(|_| {
                anyhow!("Invalid GATEWAY_SWEEP_INTERVAL_SECONDS value: {}", sweep)
            })?;
        }
        if let Ok(stats) = env::var("GATEWAY_STATS_INTERVAL_SECONDS") {
            config.gateway.stats_interval_seconds = stats.parse().map_err(|_| {
                anyhow!("Invalid GATEWAY_STATS_INTERVAL_SECONDS value: {}", stats)
            })?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load the service/gateway sections from a TOML file.
    ///
    /// The payment namespace is still resolved from the environment; it is
    /// never persisted to disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: FileSettings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config = Self {
            service: file.service,
            gateway: file.gateway,
            payment: PaymentConfig::from_env(),
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get idle channel sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.gateway.sweep_interval_seconds)
    }

    /// Get stats refresh interval as Duration
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.gateway.stats_interval_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.metrics_port == 0 {
        return Err(anyhow!("Metrics port cannot be 0"));
    }
    if config.service.http_port == config.service.metrics_port {
        return Err(anyhow!(
            "HTTP port and metrics port must differ (both {})",
            config.service.http_port
        ));
    }

    // Validate timeouts and intervals
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.gateway.sweep_interval_seconds == 0 {
        return Err(anyhow!("Sweep interval must be greater than 0"));
    }
    if config.gateway.stats_interval_seconds == 0 {
        return Err(anyhow!("Stats interval must be greater than 0"));
    }

    // Validate gateway settings
    if config.gateway.channel_capacity == 0 {
        return Err(anyhow!("Channel capacity must be greater than 0"));
    }
    if config.gateway.allowed_origin.is_empty() {
        return Err(anyhow!("Allowed origin cannot be empty"));
    }
    if !config.gateway.allowed_origin.starts_with("http") {
        return Err(anyhow!(
            "Allowed origin must be an http(s) origin: {}",
            config.gateway.allowed_origin
        ));
    }

    // The payment namespace is deliberately not validated here: loading it
    // already defaults every field, so it cannot carry an invalid value and
    // must never block startup.

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.name, "courtside");
        assert_eq!(config.gateway.channel_capacity, 256);
    }

    #[test]
    fn test_validate_rejects_port_collision() {
        let mut config = AppConfig::default();
        config.service.metrics_port = config.service.http_port;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_origin() {
        let mut config = AppConfig::default();
        config.gateway.allowed_origin = "booking.example.com".to_string();
        assert!(validate_config(&config).is_err());

        config.gateway.allowed_origin = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = AppConfig::default();
        config.gateway.channel_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_never_rejects_a_loaded_payment_namespace() {
        // Payment loading defaults every field and cannot fail; validation
        // must not re-open that contract, whatever the snapshot contained.
        for snapshot in [
            &[][..],
            &[("MERCADOPAGO_EXPIRATION_MINUTES", "0")][..],
            &[("MERCADOPAGO_EXPIRATION_MINUTES", "soon")][..],
            &[("NODE_ENV", "production"), ("API_URL", "")][..],
        ] {
            let mut config = AppConfig::default();
            config.payment = PaymentConfig::from_lookup(|key| {
                snapshot
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| value.to_string())
            });
            assert!(validate_config(&config).is_ok());
        }
    }

    #[test]
    fn test_file_settings_fill_missing_sections_with_defaults() {
        let file: FileSettings = toml::from_str(
            r#"
            [service]
            name = "courtside-staging"
            http_port = 8180
            "#,
        )
        .unwrap();

        assert_eq!(file.service.name, "courtside-staging");
        assert_eq!(file.service.http_port, 8180);
        // Unspecified fields and sections keep their defaults
        assert_eq!(file.service.metrics_port, 9090);
        assert_eq!(file.gateway.channel_capacity, 256);
    }

    fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("courtside-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).expect("Failed to write temp config");
        path
    }

    #[test]
    fn test_from_file_loads_service_and_gateway_sections() {
        let path = write_temp_config(
            "load",
            r#"
            [service]
            name = "courtside-staging"
            http_port = 8180
            metrics_port = 9190

            [gateway]
            allowed_origin = "https://booking.example.com"
            channel_capacity = 64
            "#,
        );

        let config = AppConfig::from_file(&path).expect("Failed to load config file");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.service.name, "courtside-staging");
        assert_eq!(config.service.http_port, 8180);
        assert_eq!(config.gateway.allowed_origin, "https://booking.example.com");
        assert_eq!(config.gateway.channel_capacity, 64);
        // The payment namespace still comes from the environment, never the file
        assert_eq!(config.payment.default_currency, "ARS");
    }

    #[test]
    fn test_from_file_rejects_missing_file() {
        let error = AppConfig::from_file("/nonexistent/courtside.toml").unwrap_err();
        assert!(error.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_from_file_rejects_malformed_toml() {
        let path = write_temp_config("malformed", "[service\nname = ");

        let error = AppConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(error.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_from_file_rejects_invalid_settings() {
        let path = write_temp_config(
            "invalid",
            r#"
            [service]
            http_port = 9090
            metrics_port = 9090
            "#,
        );

        let result = AppConfig::from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }
}
