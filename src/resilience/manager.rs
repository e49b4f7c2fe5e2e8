//! Registry of named circuit breakers.
//!
//! One breaker per logical dependency, created on first lookup and kept for
//! the life of the process. The registry is an ordinary value handed to
//! whoever needs breaker access.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::ServiceConfig;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::types::{BreakerConfig, BreakerStats, CircuitState};

/// Keyed collection of circuit breakers.
pub struct BreakerManager {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    clock: Arc<dyn Clock>,
}

impl BreakerManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Registry whose breakers all read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            breakers: DashMap::new(),
            clock,
        }
    }

    /// Build a registry with every breaker declared in the service config.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let manager = Self::new();
        for (name, settings) in &config.breakers {
            manager.get_breaker(name, settings.to_breaker_config());
        }
        manager
    }

    /// Get the breaker for `name`, creating it with `config` if missing.
    ///
    /// A breaker that already exists keeps its original configuration; a
    /// differing `config` is logged and otherwise ignored.
    pub fn get_breaker(&self, name: &str, config: BreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.get(name) {
            warn_on_config_mismatch(&existing, &config);
            return existing;
        }

        let mut created = false;
        let breaker = self
            .breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(CircuitBreaker::with_clock(
                    name,
                    config.clone(),
                    self.clock.clone(),
                ))
            })
            .clone();

        if created {
            tracing::info!(
                breaker = %name,
                max_half_open_requests = breaker.config().max_half_open_requests,
                reset_interval = ?breaker.config().reset_interval,
                open_timeout = ?breaker.config().open_timeout,
                failure_ratio_threshold = breaker.config().failure_ratio_threshold,
                minimum_requests_to_trip = breaker.config().minimum_requests_to_trip,
                "Circuit breaker registered"
            );
        } else {
            // Lost the race to another first use.
            warn_on_config_mismatch(&breaker, &config);
        }
        breaker
    }

    /// Look up a breaker without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.value().clone())
    }

    /// Registered breaker names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Snapshot of every registered breaker.
    pub fn stats(&self) -> BTreeMap<String, BreakerStats> {
        // Clone the handles first so no breaker lock is taken while a shard
        // guard is held.
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|e| e.value().clone()).collect();
        breakers
            .into_iter()
            .map(|b| (b.name().to_string(), b.stats()))
            .collect()
    }

    /// Names of breakers currently open.
    pub fn open_breakers(&self) -> Vec<String> {
        self.stats()
            .into_iter()
            .filter(|(_, stats)| stats.state == CircuitState::Open)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for BreakerManager {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_on_config_mismatch(existing: &CircuitBreaker, requested: &BreakerConfig) {
    let requested = requested.clone().normalized();
    if existing.config() != &requested {
        tracing::warn!(
            breaker = %existing.name(),
            existing = ?existing.config(),
            requested = ?requested,
            "Circuit breaker already registered with a different configuration; keeping the original"
        );
    }
}
