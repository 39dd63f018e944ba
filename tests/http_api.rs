//! HTTP surface, driven in-process through the full middleware stack.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use cf_tracker::config::{RouteConfig, RouteKind, TrackerConfig, TransformKind};
use cf_tracker::gate::{CounterStore, MemoryCounterStore, QuotaGate, StoreError};
use cf_tracker::http::{AppState, HttpServer};
use cf_tracker::remote::ResilientClient;

mod common;

struct BrokenStore;

#[async_trait]
impl CounterStore for BrokenStore {
    async fn increment(&self, _key: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set_expiry(&self, _key: &str, _seconds: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

fn config_with(upstream: SocketAddr) -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.gate.privileged_secret = "admin-pw".into();
    config.gate.limited_secret = "guest-pw".into();
    config.gate.daily_limit = 2;
    config.remote.upstream_url = format!("http://{}/api", upstream);
    config.remote.max_attempts = 1;
    config.remote.base_delay_ms = 1;
    config.remote.attempt_timeout_secs = 2;
    config.remote.routes = vec![RouteConfig {
        name: "direct".into(),
        kind: RouteKind::Direct,
        base_url: format!("http://{}/api", upstream),
        query_key: None,
        unavailable_status: None,
        transform: TransformKind::Identity,
    }];
    config.leaderboard.chunk_delay_ms = 0;
    config
}

fn app(config: &TrackerConfig, store: Arc<dyn CounterStore>) -> Router {
    let client = Arc::new(ResilientClient::from_config(&config.remote).unwrap());
    let gate = Arc::new(QuotaGate::new(&config.gate, store));
    let state = AppState::new(config, client, gate).unwrap();
    let peer: SocketAddr = "10.0.0.9:40000".parse().unwrap();
    HttpServer::build_router(config, state).layer(MockConnectInfo(peer))
}

async fn verify(app: &Router, body: Value, forwarded: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header("content-type", "application/json");
    if let Some(hop) = forwarded {
        request = request.header("x-forwarded-for", hop);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_verify_tiers_and_quota() {
    let upstream = common::closed_addr().await;
    let config = config_with(upstream);
    let app = app(&config, Arc::new(MemoryCounterStore::new()));

    let (status, body) = verify(&app, json!({"password": "admin-pw"}), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "type": "admin"}));

    let (status, body) = verify(&app, json!({"password": "guest-pw"}), Some("1.2.3.4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "type": "guest", "remaining": 1}));

    let (_, body) = verify(&app, json!({"credential": "guest-pw"}), Some("1.2.3.4")).await;
    assert_eq!(body["remaining"], 0);

    let (status, body) = verify(&app, json!({"password": "guest-pw"}), Some("1.2.3.4")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({
            "success": false,
            "limit": 2,
            "message": "Daily limit exceeded (2/2). Try again tomorrow."
        })
    );

    // A different identity has its own bucket.
    let (status, body) = verify(&app, json!({"password": "guest-pw"}), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining"], 1);
}

#[tokio::test]
async fn test_verify_rejects_unknown_and_missing_credentials() {
    let upstream = common::closed_addr().await;
    let config = config_with(upstream);
    let app = app(&config, Arc::new(MemoryCounterStore::new()));

    for body in [json!({"password": "nope"}), json!({})] {
        let (status, body) = verify(&app, body, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "message": "Invalid Credentials"}));
    }
}

#[tokio::test]
async fn test_verify_unreadable_body_is_invalid_credentials() {
    let upstream = common::closed_addr().await;
    let config = config_with(upstream);
    let app = app(&config, Arc::new(MemoryCounterStore::new()));

    let form = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .body(Body::from("password=guest-pw"))
        .unwrap();
    let malformed = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    for request in [form, malformed] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "message": "Invalid Credentials"}));
    }
}

#[tokio::test]
async fn test_untrusted_forwarded_for_shares_the_peer_bucket() {
    let upstream = common::closed_addr().await;
    let mut config = config_with(upstream);
    config.listener.trust_forwarded_for = false;
    let app = app(&config, Arc::new(MemoryCounterStore::new()));

    let (_, body) = verify(&app, json!({"password": "guest-pw"}), Some("1.1.1.1")).await;
    assert_eq!(body["remaining"], 1);
    let (_, body) = verify(&app, json!({"password": "guest-pw"}), Some("2.2.2.2")).await;
    assert_eq!(body["remaining"], 0);
    let (status, _) = verify(&app, json!({"password": "guest-pw"}), Some("3.3.3.3")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_verify_store_failure_is_server_error() {
    let upstream = common::closed_addr().await;
    let config = config_with(upstream);
    let app = app(&config, Arc::new(BrokenStore));

    let (status, body) = verify(&app, json!({"password": "guest-pw"}), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Server Error"}));

    // The privileged tier never touches the store.
    let (status, _) = verify(&app, json!({"password": "admin-pw"}), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_contests_served_and_unavailable() {
    let upstream = common::start_mock_backend(200, common::CONTESTS_OK).await;
    let app_up = app(&config_with(upstream), Arc::new(MemoryCounterStore::new()));

    let (status, body) = get(&app_up, "/api/contests").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let down = common::start_mock_backend(503, "busy").await;
    let app_down = app(&config_with(down), Arc::new(MemoryCounterStore::new()));

    let (status, body) = get(&app_down, "/api/contests").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("retry"));
}

#[tokio::test]
async fn test_relay_forwards_method_and_query() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = seen.clone();
    let upstream = common::start_programmable_backend(move |target| {
        log.lock().unwrap().push(target);
        async { (200, r#"{"status":"OK","result":[]}"#.to_string()) }
    })
    .await;
    let app = app(&config_with(upstream), Arc::new(MemoryCounterStore::new()));

    let (status, body) = get(&app, "/api/cf/user.info?handles=tourist%3Bpetr").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "result": []}));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["/api/user.info?handles=tourist%3Bpetr".to_string()]
    );
}

#[tokio::test]
async fn test_relay_unreachable_upstream_is_failed_envelope() {
    let upstream = common::closed_addr().await;
    let app = app(&config_with(upstream), Arc::new(MemoryCounterStore::new()));

    let (status, body) = get(&app, "/api/cf/contest.list").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "FAILED");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let upstream = common::closed_addr().await;
    let app = app(&config_with(upstream), Arc::new(MemoryCounterStore::new()));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
