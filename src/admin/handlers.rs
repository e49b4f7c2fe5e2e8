use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::resilience::BreakerStats;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub open_breakers: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let open_breakers = state.manager.open_breakers();
    let status = if open_breakers.is_empty() {
        "operational"
    } else {
        "degraded"
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        open_breakers,
    })
}

pub async fn get_breakers(State(state): State<AdminState>) -> Json<BTreeMap<String, BreakerStats>> {
    Json(state.manager.stats())
}

pub async fn get_breaker(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Response {
    match state.manager.get(&name) {
        Some(breaker) => Json(breaker.stats()).into_response(),
        None => (StatusCode::NOT_FOUND, "Circuit breaker not found").into_response(),
    }
}
