//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → BreakerSettings → BreakerConfig for each named breaker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breakers keep the config they were
//!   created with
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, BreakerSettings, ObservabilityConfig, ServiceConfig, FORECAST_BREAKER};
