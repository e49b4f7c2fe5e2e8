//! Circuit breaker state, counters, configuration and stats snapshots.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};

/// Breaker operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests flow through and are counted.
    Closed,
    /// Requests are rejected without reaching the dependency.
    Open,
    /// A limited number of probe requests are let through.
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// Numeric encoding for the `breaker_state` gauge.
    pub fn gauge_value(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request tally for a single generation.
///
/// Exactly one of the consecutive counters is non-zero once the first result
/// of the generation has been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    pub(crate) fn on_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    pub(crate) fn on_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.consecutive_successes = self.consecutive_successes.saturating_add(1);
        self.consecutive_failures = 0;
    }

    pub(crate) fn on_failure(&mut self) {
        self.total_failures = self.total_failures.saturating_add(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_successes = 0;
    }

    pub(crate) fn clear(&mut self) {
        *self = Counts::default();
    }

    /// Fraction of admitted requests that failed. Zero when nothing was admitted.
    pub fn failure_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_failures as f64 / self.requests as f64
        }
    }
}

/// Open timeout applied when a zero timeout is configured.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for one breaker. Immutable once the breaker is built.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// Probe requests admitted while half-open; also the number of
    /// consecutive probe successes needed to close.
    pub max_half_open_requests: u32,
    /// Length of a counting generation in the closed state. Zero disables
    /// periodic resets.
    pub reset_interval: Duration,
    /// Time spent open before probing.
    pub open_timeout: Duration,
    /// Failure ratio at or above which the breaker trips.
    pub failure_ratio_threshold: f64,
    /// Requests needed in a generation before the ratio is considered.
    pub minimum_requests_to_trip: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_half_open_requests: 3,
            reset_interval: Duration::from_secs(10),
            open_timeout: Duration::from_secs(30),
            failure_ratio_threshold: 0.5,
            minimum_requests_to_trip: 3,
        }
    }
}

impl BreakerConfig {
    /// Apply the fallbacks for out-of-range values: zero probe slots become
    /// one, a zero open timeout becomes [`DEFAULT_OPEN_TIMEOUT`].
    pub fn normalized(mut self) -> Self {
        if self.max_half_open_requests == 0 {
            self.max_half_open_requests = 1;
        }
        if self.open_timeout.is_zero() {
            self.open_timeout = DEFAULT_OPEN_TIMEOUT;
        }
        self
    }

    /// Whether the closed-state counts warrant opening the circuit.
    pub fn ready_to_trip(&self, counts: &Counts) -> bool {
        counts.requests >= self.minimum_requests_to_trip
            && counts.failure_ratio() >= self.failure_ratio_threshold
    }
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerStats {
    pub state: CircuitState,
    pub generation: u64,
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    #[serde(rename = "last_state_change_unix_ms", serialize_with = "unix_millis")]
    pub last_state_change: SystemTime,
}

impl BreakerStats {
    pub(crate) fn new(
        state: CircuitState,
        generation: u64,
        counts: Counts,
        last_state_change: SystemTime,
    ) -> Self {
        Self {
            state,
            generation,
            requests: counts.requests,
            total_successes: counts.total_successes,
            total_failures: counts.total_failures,
            consecutive_successes: counts.consecutive_successes,
            consecutive_failures: counts.consecutive_failures,
            last_state_change,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            requests: self.requests,
            total_successes: self.total_successes,
            total_failures: self.total_failures,
            consecutive_successes: self.consecutive_successes,
            consecutive_failures: self.consecutive_failures,
        }
    }
}

fn unix_millis<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    serializer.serialize_u64(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_consecutive_are_exclusive() {
        let mut counts = Counts::default();
        counts.on_request();
        counts.on_success();
        counts.on_request();
        counts.on_success();
        assert_eq!(counts.consecutive_successes, 2);
        assert_eq!(counts.consecutive_failures, 0);

        counts.on_request();
        counts.on_failure();
        assert_eq!(counts.consecutive_successes, 0);
        assert_eq!(counts.consecutive_failures, 1);
        assert_eq!(counts.requests, 3);
        assert_eq!(counts.total_successes, 2);
        assert_eq!(counts.total_failures, 1);

        counts.clear();
        assert_eq!(counts, Counts::default());
    }

    #[test]
    fn test_failure_ratio_of_empty_counts_is_zero() {
        assert_eq!(Counts::default().failure_ratio(), 0.0);
    }

    #[test]
    fn test_ready_to_trip_needs_minimum_requests() {
        let config = BreakerConfig {
            minimum_requests_to_trip: 3,
            failure_ratio_threshold: 0.5,
            ..Default::default()
        };
        let two_failures = Counts {
            requests: 2,
            total_failures: 2,
            consecutive_failures: 2,
            ..Default::default()
        };
        assert!(!config.ready_to_trip(&two_failures));

        let half_of_four = Counts {
            requests: 4,
            total_successes: 2,
            total_failures: 2,
            consecutive_failures: 1,
            ..Default::default()
        };
        assert!(config.ready_to_trip(&half_of_four));
    }

    #[test]
    fn test_normalized_fills_zero_values() {
        let config = BreakerConfig {
            max_half_open_requests: 0,
            open_timeout: Duration::ZERO,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.max_half_open_requests, 1);
        assert_eq!(config.open_timeout, DEFAULT_OPEN_TIMEOUT);
    }

    #[test]
    fn test_stats_serialize_with_unix_millis() {
        let stats = BreakerStats::new(
            CircuitState::HalfOpen,
            4,
            Counts::default(),
            UNIX_EPOCH + Duration::from_millis(1_234),
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["state"], "half_open");
        assert_eq!(json["last_state_change_unix_ms"], 1_234);
        assert_eq!(json["generation"], 4);
    }
}
