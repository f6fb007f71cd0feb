//! Route-level tests driving the router in-process

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chord_api::{create_router, ApiState};
use chord_core::{Address, Amount, Ledger, LedgerConfig};
use chord_storage::LedgerStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn ledger() -> Ledger {
    let config = LedgerConfig::new(
        Amount::from_raw(100_000_000),
        0,
        500,
        1000,
        50,
        120,
        Amount::from_raw(500_000),
        5000,
    )
    .with_administrator(Address::from("admin"));
    Ledger::new(config).unwrap()
}

fn app() -> Router {
    create_router(ApiState::new(ledger()))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_transfer_and_balance() {
    let app = app();

    let (status, receipt) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "origin", "to": "alice", "amount": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["fee_bps"], 500);
    assert_eq!(receipt["gross_fee"], 50);
    assert_eq!(receipt["net_amount"], 950);

    let (status, balance) = get(&app, "/ledger/balance/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["balance"], 950);
    assert_eq!(balance["excluded"], false);
}

#[tokio::test]
async fn test_rejected_transfer() {
    let app = app();

    let (status, body) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "alice", "to": "bob", "amount": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "insufficient_balance");

    let (status, body) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "origin", "to": "bob", "amount": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");

    let (status, body) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "origin", "to": "", "amount": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_address");
}

#[tokio::test]
async fn test_epoch_advance_visible_in_info() {
    let app = app();

    let (status, receipt) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "origin", "to": "alice", "amount": 10_000_000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["redistribution"]["epoch"], 1);
    assert_eq!(receipt["redistribution"]["mint_amount"], 250_000);

    let (_, info) = get(&app, "/ledger/info").await;
    assert_eq!(info["total_supply"], 99_750_000);
    assert_eq!(info["current_epoch"], 1);
    assert_eq!(info["current_fee_bps"], 500);
    assert_eq!(info["total_net_burn"], 250_000);

    let (_, fee) = get(&app, "/ledger/fee").await;
    assert_eq!(fee["lifetime_burn"], 500_000);
    assert_eq!(fee["total_epochs"], 120);
}

#[tokio::test]
async fn test_exemption_requires_administrator() {
    let app = app();
    let request = json!({ "caller": "origin", "account": "pool" });

    let (status, body) = post(&app, "/exemptions/exclude", request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let request = json!({ "caller": "admin", "account": "pool" });
    let (status, body) = post(&app, "/exemptions/exclude", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["excluded"], true);

    let (status, body) = post(&app, "/exemptions/exclude", request.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_excluded");

    let (_, list) = get(&app, "/exemptions").await;
    assert_eq!(list, json!(["pool"]));

    let (status, _) = post(&app, "/exemptions/include", request).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app, "/exemptions/pool").await;
    assert_eq!(body["excluded"], false);
}

#[tokio::test]
async fn test_delegated_transfer() {
    let app = app();

    let (status, body) = post(
        &app,
        "/ledger/approve",
        json!({ "owner": "origin", "spender": "broker", "amount": 2_000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowance"], 2_000);

    let (status, receipt) = post(
        &app,
        "/ledger/transfer_from",
        json!({ "spender": "broker", "owner": "origin", "to": "carol", "amount": 1_500 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["sender"], "origin");

    let (_, body) = get(&app, "/ledger/allowance/origin/broker").await;
    assert_eq!(body["allowance"], 500);

    let (status, body) = post(
        &app,
        "/ledger/transfer_from",
        json!({ "spender": "broker", "owner": "origin", "to": "carol", "amount": 501 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "insufficient_allowance");
}

#[tokio::test]
async fn test_mutations_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LedgerStore::open(dir.path()).unwrap());
    let app = create_router(ApiState::new(ledger()).with_store(store.clone()));

    let (status, _) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "origin", "to": "alice", "amount": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let saved = store.load_ledger().unwrap();
    assert_eq!(saved.balance_of(&Address::from("alice")).raw(), 950);

    // A rejected request leaves the snapshot alone.
    let (status, _) = post(
        &app,
        "/ledger/transfer",
        json!({ "from": "nobody", "to": "alice", "amount": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.load_ledger().unwrap(), saved);
}

#[tokio::test]
async fn test_failed_snapshot_leaves_ledger_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = Arc::new(LedgerStore::open(&data_dir).unwrap());
    let state = ApiState::new(ledger()).with_store(store);
    let app = create_router(state.clone());

    // Swap the data dir for a plain file so every snapshot write fails.
    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, b"not a directory").unwrap();

    let request = json!({ "from": "origin", "to": "alice", "amount": 1000 });
    for _ in 0..2 {
        let (status, body) = post(&app, "/ledger/transfer", request.clone()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "storage_error");
    }

    let ledger = state.ledger.read().await;
    assert_eq!(ledger.balance_of(&Address::from("alice")), Amount::ZERO);
    assert_eq!(ledger.total_burn(), Amount::ZERO);
    drop(ledger);

    let (_, balance) = get(&app, "/ledger/balance/alice").await;
    assert_eq!(balance["balance"], 0);
}
