//! Admin API routes exercised in-process.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use weather_breaker::admin::{setup_admin_router, AdminState};
use weather_breaker::resilience::BreakerManager;

mod common;

fn router(manager: Arc<BreakerManager>, api_key: &str) -> Router {
    setup_admin_router(AdminState::new(manager, api_key))
}

async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> Value {
    let (status, body) = get(app, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_status_reports_open_breakers() {
    let manager = Arc::new(BreakerManager::new());
    let cb = manager.get_breaker("nws-api", common::scenario_config());

    let status = get_json(router(manager.clone(), ""), "/admin/status").await;
    assert_eq!(status["status"], "operational");
    assert_eq!(status["open_breakers"], serde_json::json!([]));

    for _ in 0..3 {
        let _ = common::fail(&cb);
    }

    let status = get_json(router(manager, ""), "/admin/status").await;
    assert_eq!(status["status"], "degraded");
    assert_eq!(status["open_breakers"], serde_json::json!(["nws-api"]));
    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_breakers_lists_stats_by_name() {
    let manager = Arc::new(BreakerManager::new());
    let forecast = manager.get_breaker("nws-api", common::scenario_config());
    manager.get_breaker("geocoder", common::scenario_config());
    let _ = common::succeed(&forecast);
    let _ = common::fail(&forecast);

    let breakers = get_json(router(manager, ""), "/admin/breakers").await;
    let map = breakers.as_object().unwrap();
    assert_eq!(map.len(), 2);

    let nws = &breakers["nws-api"];
    assert_eq!(nws["state"], "closed");
    assert_eq!(nws["requests"], 2);
    assert_eq!(nws["total_failures"], 1);
    assert_eq!(nws["consecutive_failures"], 1);
    assert!(nws["last_state_change_unix_ms"].is_u64());
    assert_eq!(breakers["geocoder"]["requests"], 0);
}

#[tokio::test]
async fn test_single_breaker_lookup() {
    let manager = Arc::new(BreakerManager::new());
    manager.get_breaker("nws-api", common::scenario_config());

    let nws = get_json(router(manager.clone(), ""), "/admin/breakers/nws-api").await;
    assert_eq!(nws["state"], "closed");
    assert_eq!(nws["generation"], 0);

    let (status, _) = get(router(manager, ""), "/admin/breakers/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let manager = Arc::new(BreakerManager::new());

    let (status, _) = get(router(manager.clone(), "s3cret"), "/admin/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(router(manager.clone(), "s3cret"), "/admin/status", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(router(manager, "s3cret"), "/admin/status", Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
}
