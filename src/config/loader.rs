//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [admin]
            bind_address = "127.0.0.1:18081"
            api_key = "secret"

            [observability]
            log_level = "debug"

            [breakers.nws-api]
            max_half_open_requests = 1
            reset_interval_ms = 0
            open_timeout_ms = 15000
            failure_ratio_threshold = 0.25
            minimum_requests_to_trip = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.admin.api_key, "secret");
        assert_eq!(config.observability.log_level, "debug");
        let nws = config.breakers["nws-api"].to_breaker_config();
        assert_eq!(nws.open_timeout, Duration::from_secs(15));
        assert!(nws.reset_interval.is_zero());
        assert_eq!(nws.minimum_requests_to_trip, 10);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.breakers.contains_key("nws-api"));
        assert!(config.admin.enabled);
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
            [breakers.nws-api]
            failure_ratio_threshold = 2.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: breaker 'nws-api'"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[admin\nenabled = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/weather-breaker.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
