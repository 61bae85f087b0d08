//! Test utilities and fixtures for CampusPay integration tests

#![allow(dead_code)]

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub use campuspay::db::{init_db, queries, AppState};
pub use campuspay::error::{AppError, Result};
pub use campuspay::models::*;
pub use campuspay::payments::{signature, PaymentGateway, PaymentLinkRequest};

/// Checksum secret used across the test suite
pub const TEST_CHECKSUM_KEY: &str = "test-checksum-key";

/// Gateway stub that hands back a deterministic checkout URL and records
/// every request it receives.
pub struct FakeGateway {
    pub requests: Mutex<Vec<PaymentLinkRequest>>,
    fail: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A gateway that is down: every link creation fails.
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<String> {
        if self.fail {
            return Err(AppError::GatewayUnavailable("gateway down".into()));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(format!(
            "https://pay.example.test/checkout/{}",
            request.order_code
        ))
    }
}

/// Create an AppState for testing with an in-memory database.
/// Pool size 1 so every handler call sees the same in-memory database.
pub fn create_test_app_state() -> (AppState, Arc<FakeGateway>) {
    create_test_app_state_with(Arc::new(FakeGateway::new()))
}

pub fn create_test_app_state_with(gateway: Arc<FakeGateway>) -> (AppState, Arc<FakeGateway>) {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let state = AppState {
        db: pool,
        gateway: gateway.clone(),
        checksum_key: TEST_CHECKSUM_KEY.to_string(),
    };
    (state, gateway)
}

/// Create a Router with all endpoints
pub fn app(state: AppState) -> Router {
    campuspay::handlers::router().with_state(state)
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test store with an explicit id
pub fn create_test_store(conn: &Connection, id: &str, name: &str) -> Store {
    let input = CreateStore {
        id: Some(id.to_string()),
        name: name.to_string(),
    };
    queries::create_store(conn, &input).expect("Failed to create test store")
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// HMAC-SHA256 hex digest, computed independently of the crate's codec so
/// canonicalization drift shows up as a test failure.
pub fn hmac_hex(canonical: &str, secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Build a gateway webhook body for a successful payment.
/// The signature covers the `data` fields with keys in sorted order.
pub fn webhook_body(order_code: i32, amount: i64) -> String {
    let canonical = format!(
        "amount={}&code=00&desc=success&orderCode={}",
        amount, order_code
    );
    let signature = hmac_hex(&canonical, TEST_CHECKSUM_KEY);
    serde_json::json!({
        "code": "00",
        "desc": "success",
        "success": true,
        "data": {
            "orderCode": order_code,
            "amount": amount,
            "code": "00",
            "desc": "success",
        },
        "signature": signature,
    })
    .to_string()
}

/// Build a webhook body whose transaction result code marks a failed payment.
pub fn failed_webhook_body(order_code: i32, amount: i64) -> String {
    let canonical = format!(
        "amount={}&code=01&desc=failed&orderCode={}",
        amount, order_code
    );
    let signature = hmac_hex(&canonical, TEST_CHECKSUM_KEY);
    serde_json::json!({
        "code": "01",
        "desc": "failed",
        "success": false,
        "data": {
            "orderCode": order_code,
            "amount": amount,
            "code": "01",
            "desc": "failed",
        },
        "signature": signature,
    })
    .to_string()
}

/// Count entitlement grants recorded for a store
pub fn count_grants(conn: &Connection, store_id: &str) -> usize {
    queries::list_grants_for_store(conn, store_id)
        .expect("Failed to list grants")
        .len()
}
