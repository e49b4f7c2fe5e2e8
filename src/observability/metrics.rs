//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_state_transitions_total` (counter): by breaker, from, to
//! - `breaker_rejections_total` (counter): by breaker, reason
//! - `breaker_calls_total` (counter): admitted calls by breaker, outcome
//! - `breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so the breaker can
//!   always emit
//! - Labels are breaker names, which are bounded by configuration

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_state_transition(breaker: &str, from: CircuitState, to: CircuitState) {
    counter!(
        "breaker_state_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_state(breaker, to);
}

pub fn record_state(breaker: &str, state: CircuitState) {
    gauge!("breaker_state", "breaker" => breaker.to_string()).set(state.gauge_value());
}

pub fn record_rejection(breaker: &str, reason: &'static str) {
    counter!(
        "breaker_rejections_total",
        "breaker" => breaker.to_string(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_call(breaker: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "breaker_calls_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
