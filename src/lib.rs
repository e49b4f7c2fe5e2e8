//! Circuit breaker engine for the weather service's upstream dependencies.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::ServiceConfig;
pub use resilience::{BreakerConfig, BreakerError, BreakerManager, CircuitBreaker, CircuitState};
