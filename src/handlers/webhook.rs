use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::queries::{self, Resolution};
use crate::db::AppState;
use crate::payments::signature;

/// Gateway webhook payload: the signed `data` object plus its signature.
///
/// `data` is kept as a raw map because the signature covers every field in
/// it, including ones this service does not otherwise use.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub data: Map<String, Value>,
    pub signature: String,
}

#[derive(Serialize)]
struct WebhookAck {
    success: bool,
}

#[derive(Serialize)]
struct WebhookError {
    error: String,
}

fn ack() -> Response {
    (StatusCode::OK, axum::Json(WebhookAck { success: true })).into_response()
}

fn reject(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(WebhookError {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn db_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(WebhookError {
            error: "Database error".to_string(),
        }),
    )
        .into_response()
}

/// Handle a payment-outcome webhook from the gateway.
///
/// Deliveries may repeat and arrive out of order. Rejections (400) are
/// reserved for payloads that fail parsing or authenticity; anything that
/// merely fails to match pending state is acknowledged with 200 so the
/// gateway stops retrying - a stale or duplicate delivery is expected
/// traffic, not an attack.
pub async fn handle_payment_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    // 1. Parse. Malformed payloads never reach the persistence layer.
    let webhook: PaymentWebhook = match serde_json::from_slice(&body) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("Webhook rejected: invalid payload: {}", e);
            return reject("Invalid payload");
        }
    };

    // 2. Authenticity. Only fields covered by the signature are trusted.
    match signature::verify_webhook_data(&webhook.data, &webhook.signature, &state.checksum_key) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Webhook rejected: signature mismatch");
            return reject("Invalid signature");
        }
        Err(e) => {
            tracing::error!("Webhook signature verification error: {}", e);
            return reject("Invalid signature");
        }
    }

    let order_code = match webhook
        .data
        .get("orderCode")
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
    {
        Some(code) => code,
        None => {
            tracing::warn!("Webhook rejected: missing or non-numeric orderCode");
            return reject("Invalid payload");
        }
    };
    let amount = match webhook.data.get("amount").and_then(Value::as_i64) {
        Some(a) => a,
        None => {
            tracing::warn!("Webhook rejected: missing or non-numeric amount");
            return reject("Invalid payload");
        }
    };

    // The per-transaction result code: anything but "00" is an unsuccessful
    // payment, acknowledged without touching the pending slot so the payer
    // can retry the same order.
    if let Some(code) = webhook.data.get("code").and_then(Value::as_str) {
        if code != "00" {
            tracing::debug!(
                "Webhook ignored: transaction not successful (code {}) for order {}",
                code,
                order_code
            );
            return ack();
        }
    }

    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return db_error();
        }
    };

    // 3-4. Resolve against the pending slot and commit at most once.
    match queries::resolve_pending_order_with_retry(&mut conn, order_code, amount) {
        Ok(Resolution::Committed {
            store_id,
            entitlement,
        }) => {
            tracing::info!(
                "Payment confirmed: store={}, order_code={}, entitlement={}",
                store_id,
                order_code,
                entitlement.as_str()
            );
            ack()
        }
        Ok(Resolution::NoPending) => {
            tracing::debug!("Webhook ignored: no pending order for code {}", order_code);
            ack()
        }
        Ok(Resolution::AmountMismatch {
            store_id,
            expected,
            got,
        }) => {
            tracing::warn!(
                "Webhook ignored: amount mismatch for store={}, order_code={} (expected {:?}, got {})",
                store_id,
                order_code,
                expected,
                got
            );
            ack()
        }
        Err(e) => {
            tracing::error!("Webhook resolution failed: {}", e);
            db_error()
        }
    }
}
