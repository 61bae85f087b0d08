use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::error::{AppError, Result};

use super::{PaymentGateway, PaymentLinkRequest};

/// Gateway calls are bounded; on timeout the checkout fails and the user's
/// only recourse is a fresh attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentLinkBody<'a> {
    order_code: i32,
    amount: i64,
    description: &'a str,
    cancel_url: &'a str,
    return_url: &'a str,
    signature: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePaymentLinkResponse {
    code: String,
    desc: String,
    data: Option<PaymentLinkData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentLinkData {
    checkout_url: String,
}

/// PayOS payment-link client.
#[derive(Debug, Clone)]
pub struct PayOsClient {
    client: Client,
    client_id: String,
    api_key: String,
    base_url: String,
}

impl PayOsClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for PayOsClient {
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<String> {
        let body = CreatePaymentLinkBody {
            order_code: request.order_code,
            amount: request.amount,
            description: &request.description,
            cancel_url: &request.cancel_url,
            return_url: &request.return_url,
            signature: &request.signature,
        };

        let response = self
            .client
            .post(format!("{}/v2/payment-requests", self.base_url))
            .header("x-client-id", &self.client_id)
            .header("x-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GatewayUnavailable(format!("PayOS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::GatewayUnavailable(format!(
                "PayOS returned {}: {}",
                status, error_text
            )));
        }

        let parsed: CreatePaymentLinkResponse = response.json().await.map_err(|e| {
            AppError::GatewayUnavailable(format!("Failed to parse PayOS response: {}", e))
        })?;

        if parsed.code != "00" {
            return Err(AppError::GatewayUnavailable(format!(
                "PayOS rejected the order: {} (code {})",
                parsed.desc, parsed.code
            )));
        }

        let data = parsed.data.ok_or_else(|| {
            AppError::GatewayUnavailable("PayOS response missing payment link".into())
        })?;

        Ok(data.checkout_url)
    }
}
