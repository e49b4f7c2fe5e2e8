//! Admin API.
//!
//! # Endpoints
//! - `GET /admin/status`: version plus "operational" or "degraded" when any
//!   breaker is open
//! - `GET /admin/breakers`: stats for every registered breaker
//! - `GET /admin/breakers/{name}`: stats for one breaker
//!
//! Stats reads apply due timer transitions the same way calls do.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::resilience::BreakerManager;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub manager: Arc<BreakerManager>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(manager: Arc<BreakerManager>, api_key: &str) -> Self {
        Self {
            manager,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/breakers", get(get_breakers))
        .route("/admin/breakers/{name}", get(get_breaker))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until a shutdown signal arrives.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
