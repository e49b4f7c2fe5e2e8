//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Register every configured breaker
//! - Bind the admin listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: a bind error is fatal
//! - Breakers are registered before the admin API starts

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::admin::{self, AdminState};
use crate::config::ServiceConfig;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::resilience::BreakerManager;

/// Bring the service up and block until shutdown completes.
pub async fn run(config: ServiceConfig) -> Result<(), std::io::Error> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let manager = Arc::new(BreakerManager::from_config(&config));
    tracing::info!(breakers = ?manager.names(), "Circuit breakers ready");

    let shutdown = Shutdown::new();
    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(manager.clone(), &config.admin.api_key);
        Some(tokio::spawn(admin::serve(listener, state, shutdown.subscribe())))
    } else {
        tracing::info!("Admin API disabled");
        None
    };

    signals::shutdown_on_ctrl_c(&shutdown).await;

    if let Some(task) = admin_task {
        match task.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "Admin task failed"),
        }
    }

    for (name, stats) in manager.stats() {
        tracing::info!(
            breaker = %name,
            state = %stats.state,
            requests = stats.requests,
            total_failures = stats.total_failures,
            "Final breaker state"
        );
    }
    Ok(())
}
