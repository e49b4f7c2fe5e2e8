//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Circuit breakers produce:
//!     → logging.rs (state changes, rejections, discarded completions)
//!     → metrics.rs (transition/rejection/call counters, state gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields for machine parsing
//! - Metrics are cheap and safe to emit before a recorder exists

pub mod logging;
pub mod metrics;
