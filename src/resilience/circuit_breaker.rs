//! Circuit breaker for upstream dependency protection.
//!
//! # States
//! - Closed: normal operation, requests pass through and are counted
//! - Open: dependency assumed down, requests fail fast
//! - Half-Open: a bounded number of probes test whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: requests >= minimum AND failure ratio >= threshold
//! Closed → Closed: reset interval elapsed (new generation, counts zeroed)
//! Open → Half-Open: open timeout elapsed
//! Half-Open → Closed: consecutive successes >= max half-open requests
//! Half-Open → Open: any probe fails
//! ```
//!
//! # Design Decisions
//! - Timers are evaluated lazily on every admission and every read
//! - The guarded operation runs outside the lock
//! - Completions carry the generation they were admitted under; a completion
//!   from an older generation is dropped
//! - Panics and dropped futures count as failures (RAII in-flight guard)

use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Instant, SystemTime};

use tracing::Instrument;

use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::error::BreakerError;
use crate::resilience::types::{BreakerConfig, BreakerStats, CircuitState, Counts};

/// Mutable breaker state. Only touched under `CircuitBreaker::inner`.
#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    generation: u64,
    counts: Counts,
    /// Deadline of the current state's timer. `None` in half-open and in
    /// closed when periodic resets are disabled.
    expiry: Option<Instant>,
    last_state_change: SystemTime,
}

impl BreakerInner {
    fn transition_due(&self, now: Instant) -> bool {
        match (self.state, self.expiry) {
            (CircuitState::HalfOpen, _) | (_, None) => false,
            (_, Some(expiry)) => now >= expiry,
        }
    }

    fn snapshot(&self) -> BreakerStats {
        BreakerStats::new(
            self.state,
            self.generation,
            self.counts,
            self.last_state_change,
        )
    }
}

/// Per-dependency circuit breaker.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    inner: RwLock<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker driven by the system clock.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Create a breaker driven by the given clock.
    pub fn with_clock(
        name: impl Into<String>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        let config = config.normalized();
        let now = clock.now();
        let expiry = closed_expiry(&config, now);

        let inner = BreakerInner {
            state: CircuitState::Closed,
            generation: 0,
            counts: Counts::default(),
            expiry,
            last_state_change: clock.system_now(),
        };
        metrics::record_state(&name, CircuitState::Closed);

        Self {
            name,
            config,
            clock,
            inner: RwLock::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized configuration this breaker runs with.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Run a synchronous operation under breaker protection.
    ///
    /// The operation's error is returned verbatim inside
    /// [`BreakerError::Dependency`]. A panic is recorded as a failure and
    /// then keeps unwinding.
    pub fn execute<T, E, F>(&self, operation: &str, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let span = tracing::debug_span!("circuit_breaker.execute", breaker = %self.name, operation);
        let _entered = span.enter();

        let in_flight = self.admit(operation)?;
        let result = f();
        in_flight.settle(result.is_ok());
        result.map_err(BreakerError::Dependency)
    }

    /// Run an asynchronous operation under breaker protection.
    ///
    /// `f` is only invoked once the call is admitted. If the returned future
    /// is dropped before it resolves, the call is recorded as a failure.
    pub async fn call<T, E, F, Fut>(&self, operation: &str, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let span = tracing::debug_span!("circuit_breaker.execute", breaker = %self.name, operation);
        let in_flight = {
            let _entered = span.enter();
            self.admit(operation)?
        };

        let result = f().instrument(span).await;
        in_flight.settle(result.is_ok());
        result.map_err(BreakerError::Dependency)
    }

    /// Current state, applying any transition that is due.
    pub fn state(&self) -> CircuitState {
        self.stats().state
    }

    /// Counts of the current generation, applying any transition that is due.
    pub fn counts(&self) -> Counts {
        self.stats().counts()
    }

    /// Snapshot of state and counts, applying any transition that is due.
    pub fn stats(&self) -> BreakerStats {
        let now = self.clock.now();
        {
            let inner = self.read();
            if !inner.transition_due(now) {
                return inner.snapshot();
            }
        }

        let mut inner = self.write();
        self.current_state(&mut inner, now);
        inner.snapshot()
    }

    fn admit<E>(&self, operation: &str) -> Result<InFlight<'_>, BreakerError<E>> {
        let now = self.clock.now();
        let mut inner = self.write();
        let state = self.current_state(&mut inner, now);

        let rejection = match state {
            CircuitState::Open => Some(BreakerError::Open {
                name: self.name.clone(),
            }),
            CircuitState::HalfOpen
                if inner.counts.requests >= self.config.max_half_open_requests =>
            {
                Some(BreakerError::TooManyRequests {
                    name: self.name.clone(),
                })
            }
            _ => None,
        };

        if let Some(err) = rejection {
            drop(inner);
            tracing::warn!(
                breaker = %self.name,
                operation,
                state = %state,
                "Circuit breaker rejected request"
            );
            metrics::record_rejection(&self.name, err.reason());
            return Err(err);
        }

        inner.counts.on_request();
        Ok(InFlight {
            breaker: self,
            generation: inner.generation,
            settled: false,
        })
    }

    fn complete(&self, generation: u64, success: bool) {
        metrics::record_call(&self.name, success);

        let now = self.clock.now();
        let mut inner = self.write();
        let state = self.current_state(&mut inner, now);

        if inner.generation != generation {
            tracing::debug!(
                breaker = %self.name,
                admitted_generation = generation,
                current_generation = inner.generation,
                success,
                "Discarding stale completion"
            );
            return;
        }

        debug_assert_ne!(
            state,
            CircuitState::Open,
            "open generations admit no calls, so none can complete"
        );

        if success {
            self.on_success(&mut inner, state, now);
        } else {
            self.on_failure(&mut inner, state, now);
        }
    }

    fn on_success(&self, inner: &mut BreakerInner, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Closed => inner.counts.on_success(),
            CircuitState::HalfOpen => {
                inner.counts.on_success();
                if inner.counts.consecutive_successes >= self.config.max_half_open_requests {
                    self.set_state(inner, CircuitState::Closed, now);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, inner: &mut BreakerInner, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Closed => {
                inner.counts.on_failure();
                if self.config.ready_to_trip(&inner.counts) {
                    tracing::warn!(
                        breaker = %self.name,
                        requests = inner.counts.requests,
                        failures = inner.counts.total_failures,
                        threshold = self.config.failure_ratio_threshold,
                        "Failure ratio reached threshold, opening circuit"
                    );
                    self.set_state(inner, CircuitState::Open, now);
                }
            }
            CircuitState::HalfOpen => {
                tracing::warn!(breaker = %self.name, "Probe failed, reopening circuit");
                self.set_state(inner, CircuitState::Open, now);
            }
            CircuitState::Open => {}
        }
    }

    /// Apply a due timer transition and return the resulting state.
    fn current_state(&self, inner: &mut BreakerInner, now: Instant) -> CircuitState {
        if inner.transition_due(now) {
            match inner.state {
                CircuitState::Closed => self.new_generation(inner, now),
                CircuitState::Open => self.set_state(inner, CircuitState::HalfOpen, now),
                CircuitState::HalfOpen => {}
            }
        }
        inner.state
    }

    fn set_state(&self, inner: &mut BreakerInner, to: CircuitState, now: Instant) {
        if inner.state == to {
            return;
        }

        let from = inner.state;
        inner.state = to;
        self.new_generation(inner, now);
        inner.last_state_change = self.clock.system_now();

        tracing::info!(
            breaker = %self.name,
            from = %from,
            to = %to,
            generation = inner.generation,
            "Circuit breaker state changed"
        );
        metrics::record_state_transition(&self.name, from, to);
    }

    fn new_generation(&self, inner: &mut BreakerInner, now: Instant) {
        inner.generation = inner.generation.wrapping_add(1);
        inner.counts.clear();
        inner.expiry = match inner.state {
            CircuitState::Closed => closed_expiry(&self.config, now),
            // An open timeout past the clock's range never elapses.
            CircuitState::Open => now.checked_add(self.config.open_timeout),
            CircuitState::HalfOpen => None,
        };
    }

    fn read(&self) -> RwLockReadGuard<'_, BreakerInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BreakerInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn closed_expiry(config: &BreakerConfig, now: Instant) -> Option<Instant> {
    if config.reset_interval.is_zero() {
        None
    } else {
        now.checked_add(config.reset_interval)
    }
}

/// An admitted call that has not reported back yet.
///
/// Dropping it without settling records a failure.
struct InFlight<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, success: bool) {
        self.settled = true;
        if !success {
            tracing::debug!(breaker = %self.breaker.name, "Guarded operation failed");
        }
        self.breaker.complete(self.generation, success);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if std::thread::panicking() {
            tracing::warn!(breaker = %self.breaker.name, "Guarded operation panicked");
        } else {
            tracing::warn!(breaker = %self.breaker.name, "Guarded operation dropped before completion");
        }
        self.breaker.complete(self.generation, false);
    }
}
