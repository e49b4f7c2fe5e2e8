//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ratios, probe counts, timeouts)
//! - Validate bind addresses

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a loaded config.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("breaker name must not be empty")]
    EmptyBreakerName,

    #[error("breaker '{name}': failure_ratio_threshold {value} must be within [0, 1]")]
    FailureRatioOutOfRange { name: String, value: f64 },

    #[error("breaker '{name}': max_half_open_requests must be at least 1")]
    NoHalfOpenRequests { name: String },

    #[error("breaker '{name}': open_timeout_ms must be greater than 0")]
    ZeroOpenTimeout { name: String },

    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check a config, collecting every problem rather than stopping at the first.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, breaker) in &config.breakers {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyBreakerName);
        }
        let ratio = breaker.failure_ratio_threshold;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            errors.push(ValidationError::FailureRatioOutOfRange {
                name: name.clone(),
                value: ratio,
            });
        } else if ratio == 0.0 {
            tracing::warn!(breaker = %name, "failure_ratio_threshold is 0; the breaker will trip on the first failure");
        }
        if breaker.max_half_open_requests == 0 {
            errors.push(ValidationError::NoHalfOpenRequests { name: name.clone() });
        }
        if breaker.open_timeout_ms == 0 {
            errors.push(ValidationError::ZeroOpenTimeout { name: name.clone() });
        }
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
