//! Upstream dependencies.
//!
//! # Data Flow
//! ```text
//! Weather handler
//!     → forecast.rs (GuardedForecastClient)
//!     → resilience (nws-api breaker admission)
//!     → ForecastClient implementation (external provider)
//! ```
//!
//! # Design Decisions
//! - Provider clients know nothing about breakers; the guard wraps them
//! - Provider errors reach the caller unchanged

pub mod forecast;

pub use forecast::{Coordinates, Forecast, ForecastClient, GuardedForecastClient};
