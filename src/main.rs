//! Weather service breaker host.
//!
//! # Architecture Overview
//!
//! ```text
//!     weather handler ──▶ GuardedForecastClient ──▶ CircuitBreaker ──▶ forecast provider
//!                                                       ▲
//!                                                       │ one per dependency
//!                                                 BreakerManager
//!                                                       │
//!     health poller  ──▶ admin API (/admin/*) ──────────┘
//! ```
//!
//! Loads the TOML config, registers every configured breaker, and serves the
//! admin stats API until Ctrl+C.

use std::path::PathBuf;

use clap::Parser;

use weather_breaker::config::{load_config, ServiceConfig};
use weather_breaker::lifecycle::startup;
use weather_breaker::observability::logging;

#[derive(Parser)]
#[command(name = "weather-breaker")]
#[command(about = "Circuit breaker host for the weather service", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        breakers = config.breakers.len(),
        "weather-breaker starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
