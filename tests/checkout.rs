//! Tests for the POST /checkout endpoint.
//!
//! The gateway is stubbed, so these cover the full checkout path: request
//! validation, pricing, pending-order persistence, and the signed link
//! request handed to the gateway.

use axum::{body::Body, http::Request};
use serde_json::{json, Value};
use tower::ServiceExt;

#[path = "common/mod.rs"]
mod common;
use common::*;

async fn post_checkout(app: axum::Router, body: Value) -> axum::http::Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/checkout")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

fn checkout_request(store_id: &str, kind: &str, ad_tier: Option<&str>) -> Value {
    let mut body = json!({
        "store_id": store_id,
        "kind": kind,
        "return_url": "https://campus.example.com/payment/return",
        "cancel_url": "https://campus.example.com/payment/cancel",
    });
    if let Some(tier) = ad_tier {
        body["ad_tier"] = json!(tier);
    }
    body
}

#[tokio::test]
async fn test_checkout_unknown_store_returns_404() {
    let (state, _) = create_test_app_state();
    let app = app(state);

    let response = post_checkout(app, checkout_request("no-such-store", "vip", None)).await;

    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_unknown_kind_returns_400() {
    let (state, _) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state);

    let response = post_checkout(app, checkout_request("s1", "gold", None)).await;

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_unknown_ad_tier_returns_400() {
    let (state, _) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state);

    let response = post_checkout(app, checkout_request("s1", "ad", Some("year"))).await;

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_rejects_non_http_redirect_urls() {
    let (state, _) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state);

    let body = json!({
        "store_id": "s1",
        "kind": "vip",
        "return_url": "javascript:alert(1)",
        "cancel_url": "https://campus.example.com/payment/cancel",
    });
    let response = post_checkout(app, body).await;

    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_ad_month_creates_pending_order() {
    let (state, gateway) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state.clone());

    let response = post_checkout(app, checkout_request("s1", "ad", Some("month"))).await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    let order_code = json["order_code"].as_i64().expect("order_code in response") as i32;
    assert_eq!(
        json["checkout_url"].as_str().unwrap(),
        format!("https://pay.example.test/checkout/{}", order_code)
    );

    // Pending slot persisted for the store
    let conn = state.db.get().unwrap();
    let store = queries::get_store_by_id(&conn, "s1").unwrap().unwrap();
    assert_eq!(store.last_order_code, Some(order_code));
    assert_eq!(store.pending_entitlement, Some(Entitlement::AdMonth));
    assert_eq!(store.pending_amount, Some(150_000));
    assert!(!store.vip, "nothing committed before the webhook");

    // The gateway saw a request signed over the canonical field set
    let requests = gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.amount, 150_000);
    let expected_signature = signature::sign_payment_request(
        sent.amount,
        &sent.cancel_url,
        &sent.description,
        sent.order_code,
        &sent.return_url,
        TEST_CHECKSUM_KEY,
    )
    .unwrap();
    assert_eq!(sent.signature, expected_signature);
}

#[tokio::test]
async fn test_checkout_vip_prices_from_table() {
    let (state, gateway) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state.clone());

    let response = post_checkout(app, checkout_request("s1", "vip", None)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let store = queries::get_store_by_id(&conn, "s1").unwrap().unwrap();
    assert_eq!(store.pending_entitlement, Some(Entitlement::VipLifetime));
    assert_eq!(store.pending_amount, Some(100_000));

    let requests = gateway.requests.lock().unwrap();
    assert_eq!(requests[0].amount, 100_000);
}

#[tokio::test]
async fn test_checkout_ad_without_tier_defaults_to_week() {
    let (state, _) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state.clone());

    let response = post_checkout(app, checkout_request("s1", "ad", None)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let conn = state.db.get().unwrap();
    let store = queries::get_store_by_id(&conn, "s1").unwrap().unwrap();
    assert_eq!(store.pending_entitlement, Some(Entitlement::AdWeek));
    assert_eq!(store.pending_amount, Some(50_000));
}

#[tokio::test]
async fn test_checkout_gateway_failure_returns_502_and_leaves_orphan() {
    let (state, _) = create_test_app_state_with(std::sync::Arc::new(FakeGateway::failing()));
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state.clone());

    let response = post_checkout(app, checkout_request("s1", "vip", None)).await;
    assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);

    // The pending record stays behind; it is harmless and superseded by the
    // next attempt.
    let conn = state.db.get().unwrap();
    let store = queries::get_store_by_id(&conn, "s1").unwrap().unwrap();
    assert_eq!(store.pending_entitlement, Some(Entitlement::VipLifetime));
}

#[tokio::test]
async fn test_second_checkout_supersedes_pending_order() {
    let (state, _) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_store(&conn, "s1", "Banh Mi Corner");
    }
    let app = app(state.clone());

    let first = post_checkout(app.clone(), checkout_request("s1", "vip", None)).await;
    assert_eq!(first.status(), axum::http::StatusCode::OK);

    let second = post_checkout(app, checkout_request("s1", "ad", Some("month"))).await;
    assert_eq!(second.status(), axum::http::StatusCode::OK);
    let body = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let second_code = json["order_code"].as_i64().unwrap() as i32;

    // Last writer wins: only the newest order is reachable
    let conn = state.db.get().unwrap();
    let store = queries::get_store_by_id(&conn, "s1").unwrap().unwrap();
    assert_eq!(store.last_order_code, Some(second_code));
    assert_eq!(store.pending_entitlement, Some(Entitlement::AdMonth));
    assert_eq!(store.pending_amount, Some(150_000));
}
