use serde::{Deserialize, Serialize};

use crate::models::Entitlement;

/// A store on the campus map, with its entitlement profile and the single
/// in-flight order slot. The pending_* fields are written together by
/// checkout and cleared together when a webhook commits.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub vip: bool,
    /// Currently active ad tier ("week" | "month"), if any
    pub ad_tier: Option<String>,
    pub ad_expires_at: Option<i64>,
    /// Order code of the most recent checkout for this store
    pub last_order_code: Option<i32>,
    pub pending_entitlement: Option<Entitlement>,
    pub pending_amount: Option<i64>,
    pub pending_created_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateStore {
    /// Explicit id (the map application's store id); generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Append-only record of a committed webhook: one row per granted package.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementGrant {
    pub id: String,
    pub store_id: String,
    pub entitlement: Entitlement,
    pub order_code: i32,
    pub amount: i64,
    pub granted_at: i64,
}
