//! Shared helpers for breaker integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use weather_breaker::resilience::{BreakerConfig, BreakerError, BreakerManager, CircuitBreaker, ManualClock};

/// A registry whose breakers read time from a manual clock.
pub fn manual_manager() -> (BreakerManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (BreakerManager::with_clock(clock.clone()), clock)
}

/// The forecast breaker settings used throughout the scenarios.
pub fn scenario_config() -> BreakerConfig {
    BreakerConfig {
        max_half_open_requests: 3,
        reset_interval: Duration::ZERO,
        open_timeout: Duration::from_secs(30),
        failure_ratio_threshold: 0.5,
        minimum_requests_to_trip: 3,
    }
}

pub fn succeed(cb: &CircuitBreaker) -> Result<(), BreakerError<String>> {
    cb.execute("get-forecast", || Ok(()))
}

pub fn fail(cb: &CircuitBreaker) -> Result<(), BreakerError<String>> {
    cb.execute("get-forecast", || Err("upstream returned 503".to_string()))
}
