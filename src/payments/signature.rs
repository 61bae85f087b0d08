//! Canonical signing and webhook verification for the gateway.
//!
//! Both sides compute HMAC-SHA256 over a `key=value&key=value` string with
//! keys in lexicographic order. Canonicalization must be byte-identical
//! between signing and verification; this is the only line of defense
//! against forged webhooks, so no field outside the signed set is trusted.

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{msg, AppError, Result};

type HmacSha256 = Hmac<Sha256>;

fn hmac_hex(data: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal(msg::INVALID_CHECKSUM_KEY.into()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sign the payment-link request fields.
///
/// The signed field set is fixed by the gateway: amount, cancelUrl,
/// description, orderCode, returnUrl, already in lexicographic order.
pub fn sign_payment_request(
    amount: i64,
    cancel_url: &str,
    description: &str,
    order_code: i32,
    return_url: &str,
    secret: &str,
) -> Result<String> {
    let data = format!(
        "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
        amount, cancel_url, description, order_code, return_url
    );
    hmac_hex(&data, secret)
}

/// Render a field value the way the gateway does when canonicalizing:
/// null becomes the empty string, strings are used bare, everything else
/// keeps its JSON rendering.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonicalize a webhook `data` object: every field, keys sorted.
pub fn canonicalize_webhook_data(data: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = data.keys().collect();
    keys.sort();
    keys.iter()
        .map(|k| format!("{}={}", k, render_value(&data[k.as_str()])))
        .collect::<Vec<_>>()
        .join("&")
}

/// Verify an inbound webhook's signature over its `data` fields.
///
/// Uses constant-time comparison to prevent timing attacks. The length
/// check is not constant-time, but signature length is not secret (always
/// 64 hex chars for SHA-256).
pub fn verify_webhook_data(
    data: &Map<String, Value>,
    signature: &str,
    secret: &str,
) -> Result<bool> {
    let expected = hmac_hex(&canonicalize_webhook_data(data), secret)?;

    let expected_bytes = expected.as_bytes();
    let provided_bytes = signature.as_bytes();

    if expected_bytes.len() != provided_bytes.len() {
        return Ok(false);
    }

    Ok(expected_bytes.ct_eq(provided_bytes).into())
}
