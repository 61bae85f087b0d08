mod payos;
pub mod signature;

pub use payos::PayOsClient;

use async_trait::async_trait;

use crate::error::Result;

/// Fields submitted to the gateway when creating a payment link.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub order_code: i32,
    /// Amount in VND
    pub amount: i64,
    pub description: String,
    pub return_url: String,
    pub cancel_url: String,
    /// HMAC over the request fields, computed by the caller
    pub signature: String,
}

/// Capability-typed gateway surface so the order lifecycle is testable
/// without network access.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout link; returns the URL the payer is sent to.
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<String>;
}
