//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::BreakerConfig;

/// Name of the breaker guarding the forecast provider.
pub const FORECAST_BREAKER: &str = "nws-api";

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Admin API settings (stats and status endpoints).
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Circuit breakers keyed by dependency name.
    pub breakers: BTreeMap<String, BreakerSettings>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let mut breakers = BTreeMap::new();
        breakers.insert(FORECAST_BREAKER.to_string(), BreakerSettings::default());
        Self {
            admin: AdminConfig::default(),
            observability: ObservabilityConfig::default(),
            breakers,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8081").
    pub bind_address: String,

    /// Bearer token required on admin requests. Empty disables auth.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: String::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Circuit breaker tunables as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Probe requests allowed while half-open.
    pub max_half_open_requests: u32,

    /// Closed-state counting window in milliseconds (0 = never reset).
    pub reset_interval_ms: u64,

    /// Time spent open before probing, in milliseconds.
    pub open_timeout_ms: u64,

    /// Failure ratio that trips the breaker.
    pub failure_ratio_threshold: f64,

    /// Requests needed before the ratio is evaluated.
    pub minimum_requests_to_trip: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        let config = BreakerConfig::default();
        Self {
            max_half_open_requests: config.max_half_open_requests,
            reset_interval_ms: config.reset_interval.as_millis() as u64,
            open_timeout_ms: config.open_timeout.as_millis() as u64,
            failure_ratio_threshold: config.failure_ratio_threshold,
            minimum_requests_to_trip: config.minimum_requests_to_trip,
        }
    }
}

impl BreakerSettings {
    pub fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            max_half_open_requests: self.max_half_open_requests,
            reset_interval: Duration::from_millis(self.reset_interval_ms),
            open_timeout: Duration::from_millis(self.open_timeout_ms),
            failure_ratio_threshold: self.failure_ratio_threshold,
            minimum_requests_to_trip: self.minimum_requests_to_trip,
        }
    }
}
