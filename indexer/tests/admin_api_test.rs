mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::{end, global_info, harness, start, Harness, NetworkEvents};
use stake_indexer::config::Network;
use stake_indexer::infrastructure::web::{create_router, AppState};

fn seeded() -> Harness {
    let h = harness(&[Network::Ethereum]);
    h.source.set(
        Network::Ethereum,
        NetworkEvents {
            starts: vec![
                start(Network::Ethereum, "1", 10, 40, 100),
                start(Network::Ethereum, "2", 10, 40, 101),
            ],
            ends: vec![end(Network::Ethereum, "1", 102)],
            global_info: Some(global_info(Network::Ethereum, 20)),
            fail_with: None,
        },
    );
    h
}

async fn call(h: &Harness, method: &str, uri: &str) -> (StatusCode, Value) {
    let app = create_router(AppState {
        manager: h.manager.clone(),
    });
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let h = seeded();
    let (status, body) = call(&h, "GET", "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["networks"], serde_json::json!(["ethereum"]));
}

#[tokio::test]
async fn test_resync_network_returns_report() {
    let h = seeded();
    let (status, body) = call(&h, "POST", "/api/sync/ethereum/resync").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["network"], "ethereum");
    assert_eq!(body["mode"], "full");
    assert_eq!(body["insertedCount"], 1);
    assert_eq!(body["finalState"], "completed");
    assert!(body["operations"].as_array().unwrap().len() > 3);
}

#[tokio::test]
async fn test_incremental_then_status() {
    let h = seeded();
    let (status, body) = call(&h, "POST", "/api/sync/eth/incremental").await;
    assert_eq!(status, StatusCode::OK);
    // no cursor yet
    assert_eq!(body["mode"], "full");

    let (status, body) = call(&h, "GET", "/api/sync/ethereum/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["network"], "ethereum");
    assert_eq!(body["last_synced_id"], "2");
    assert_eq!(body["sync_in_progress"], false);
}

#[tokio::test]
async fn test_resync_all_reports_each_enabled_network() {
    let h = seeded();
    let (status, body) = call(&h, "POST", "/api/sync/resync").await;

    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["network"], "ethereum");
}

#[tokio::test]
async fn test_all_statuses_include_unsynced_networks() {
    let h = seeded();
    let (status, body) = call(&h, "GET", "/api/sync/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_network_is_bad_request() {
    let h = seeded();
    let (status, body) = call(&h, "POST", "/api/sync/polygon/resync").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown network"));
}

#[tokio::test]
async fn test_disabled_network_is_conflict_with_report() {
    let h = seeded();
    let (status, body) = call(&h, "POST", "/api/sync/pulsechain/resync").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["finalState"], "idle");
}
