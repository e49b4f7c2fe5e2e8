//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to an upstream dependency:
//!     → manager.rs (look up the named breaker, create on first use)
//!     → circuit_breaker.rs (admission: reject if open / probe slots taken)
//!     → dependency operation runs outside the breaker lock
//!     → circuit_breaker.rs (accounting, tagged with the admission generation)
//!     → caller receives the dependency result or a rejection
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, never global
//! - No retries here; retry policy belongs to the caller
//! - No background timers; clock.rs is consulted lazily
//! - Dependency errors are passed through, never classified

pub mod circuit_breaker;
pub mod clock;
pub mod error;
pub mod manager;
pub mod types;

pub use circuit_breaker::CircuitBreaker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::BreakerError;
pub use manager::BreakerManager;
pub use types::{BreakerConfig, BreakerStats, CircuitState, Counts};
