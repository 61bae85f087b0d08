pub mod checkout;
pub mod stores;
pub mod webhook;

pub use checkout::initiate_checkout;
pub use stores::{create_store, get_store};
pub use webhook::handle_payment_webhook;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Checkout (consumed by the map client)
        .route("/checkout", post(initiate_checkout))
        // Webhook (called by the gateway)
        .route("/webhook/payment", post(handle_payment_webhook))
        // Store registry and entitlement read-side
        .route("/stores", post(create_store))
        .route("/stores/{id}", get(get_store))
}
