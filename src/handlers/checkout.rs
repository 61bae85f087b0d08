use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::Json;
use crate::order_code::OrderCodeGenerator;
use crate::payments::{signature, PaymentLinkRequest};
use crate::pricing;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub store_id: String,
    /// Package kind: "vip" or "ad"
    pub kind: String,
    /// Ad duration tier: "week" (default) or "month"
    #[serde(default)]
    pub ad_tier: Option<String>,
    /// Where the gateway redirects the payer after payment
    pub return_url: String,
    /// Where the gateway redirects the payer on cancellation
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub order_code: i32,
}

/// Create a payment link for a package purchase.
///
/// Prices the request, binds the order code to the store's pending slot,
/// then asks the gateway for a hosted checkout URL. If the gateway call
/// fails the pending row stays behind as a harmless orphan - the next
/// checkout attempt overwrites it.
pub async fn initiate_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    validate_redirect_url(&request.return_url, msg::INVALID_RETURN_URL)?;
    validate_redirect_url(&request.cancel_url, msg::INVALID_CANCEL_URL)?;

    let priced = pricing::price_package(&request.kind, request.ad_tier.as_deref())?;

    let conn = state.db.get()?;
    queries::get_store_by_id(&conn, &request.store_id)?.or_not_found(msg::STORE_NOT_FOUND)?;

    let order_code = OrderCodeGenerator.next();

    // Bind the in-flight order before talking to the gateway so a webhook
    // can never arrive for an order we have no record of.
    queries::set_pending_order(
        &conn,
        &request.store_id,
        order_code,
        priced.entitlement,
        priced.amount,
    )?;

    let signature = signature::sign_payment_request(
        priced.amount,
        &request.cancel_url,
        priced.description,
        order_code,
        &request.return_url,
        &state.checksum_key,
    )?;

    let link_request = PaymentLinkRequest {
        order_code,
        amount: priced.amount,
        description: priced.description.to_string(),
        return_url: request.return_url.clone(),
        cancel_url: request.cancel_url.clone(),
        signature,
    };

    let checkout_url = state.gateway.create_payment_link(&link_request).await?;

    tracing::info!(
        "Checkout link created: store={}, order_code={}, amount={}",
        request.store_id,
        order_code,
        priced.amount
    );

    Ok(Json(CheckoutResponse {
        checkout_url,
        order_code,
    }))
}

fn validate_redirect_url(url: &str, message: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::InvalidPackage(message.to_string()))
    }
}
