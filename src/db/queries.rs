use chrono::Utc;
use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateStore, Entitlement, EntitlementGrant, Store};

use super::from_row::{query_all, query_one, GRANT_COLS, STORE_COLS};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Stores ============

pub fn create_store(conn: &Connection, input: &CreateStore) -> Result<Store> {
    let id = input.id.clone().unwrap_or_else(gen_id);
    let now = now();

    conn.execute(
        "INSERT INTO stores (id, name, vip, created_at, updated_at) VALUES (?1, ?2, 0, ?3, ?3)",
        params![&id, &input.name, now],
    )?;

    Ok(Store {
        id,
        name: input.name.clone(),
        vip: false,
        ad_tier: None,
        ad_expires_at: None,
        last_order_code: None,
        pending_entitlement: None,
        pending_amount: None,
        pending_created_at: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_store_by_id(conn: &Connection, id: &str) -> Result<Option<Store>> {
    query_one(
        conn,
        &format!("SELECT {} FROM stores WHERE id = ?1", STORE_COLS),
        &[&id],
    )
}

// ============ Pending Orders ============

/// Bind an in-flight order to a store, overwriting any prior pending state.
///
/// Last writer wins: superseding an unpaid order is acceptable because the
/// old order code becomes unreachable from future webhook resolutions.
/// Returns whether the store existed.
pub fn set_pending_order(
    conn: &Connection,
    store_id: &str,
    order_code: i32,
    entitlement: Entitlement,
    amount: i64,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE stores SET last_order_code = ?1, pending_entitlement = ?2, pending_amount = ?3,
            pending_created_at = ?4, updated_at = ?4
         WHERE id = ?5",
        params![order_code, entitlement.as_str(), amount, now(), store_id],
    )?;
    Ok(updated > 0)
}

/// Outcome of resolving a paid-order webhook against the pending state.
#[derive(Debug)]
pub enum Resolution {
    /// Pending order matched; entitlement applied and recorded
    Committed {
        store_id: String,
        entitlement: Entitlement,
    },
    /// No store has this order code pending (stale, duplicate, or foreign)
    NoPending,
    /// Order code matched but the paid amount disagrees with the recorded one
    AmountMismatch {
        store_id: String,
        expected: Option<i64>,
        got: i64,
    },
}

/// Resolve a paid-order webhook and commit the entitlement, all inside one
/// immediate (write-locked) transaction so concurrent deliveries for the
/// same order serialize: the first clears the pending slot and commits, the
/// second finds the slot empty and resolves to `NoPending`.
///
/// An amount mismatch leaves the slot intact so the genuine notification
/// for that order can still land.
pub fn resolve_pending_order(
    conn: &mut Connection,
    order_code: i32,
    amount: i64,
) -> Result<Resolution> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let store: Option<Store> = query_one(
        &tx,
        &format!(
            "SELECT {} FROM stores WHERE last_order_code = ?1 AND pending_entitlement IS NOT NULL",
            STORE_COLS
        ),
        &[&order_code],
    )?;

    let Some(store) = store else {
        return Ok(Resolution::NoPending);
    };
    let Some(entitlement) = store.pending_entitlement else {
        return Ok(Resolution::NoPending);
    };

    if store.pending_amount != Some(amount) {
        return Ok(Resolution::AmountMismatch {
            store_id: store.id,
            expected: store.pending_amount,
            got: amount,
        });
    }

    let now = now();
    match entitlement.ad_terms() {
        None => {
            tx.execute(
                "UPDATE stores SET vip = 1, pending_entitlement = NULL, pending_amount = NULL,
                    pending_created_at = NULL, updated_at = ?1
                 WHERE id = ?2",
                params![now, &store.id],
            )?;
        }
        Some((tier, days)) => {
            tx.execute(
                "UPDATE stores SET ad_tier = ?1, ad_expires_at = ?2, pending_entitlement = NULL,
                    pending_amount = NULL, pending_created_at = NULL, updated_at = ?3
                 WHERE id = ?4",
                params![tier, now + days * 86400, now, &store.id],
            )?;
        }
    }

    tx.execute(
        "INSERT INTO entitlement_grants (id, store_id, entitlement, order_code, amount, granted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![gen_id(), &store.id, entitlement.as_str(), order_code, amount, now],
    )?;

    tx.commit()?;

    Ok(Resolution::Committed {
        store_id: store.id,
        entitlement,
    })
}

/// Retry a busy/locked conflict once at the transaction boundary, then
/// surface the error.
pub fn resolve_pending_order_with_retry(
    conn: &mut Connection,
    order_code: i32,
    amount: i64,
) -> Result<Resolution> {
    match resolve_pending_order(conn, order_code, amount) {
        Err(AppError::Database(e)) if is_busy(&e) => {
            tracing::warn!("Retrying webhook resolution after lock conflict: {}", e);
            resolve_pending_order(conn, order_code, amount)
        }
        other => other,
    }
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

// ============ Entitlement Grants ============

pub fn list_grants_for_store(conn: &Connection, store_id: &str) -> Result<Vec<EntitlementGrant>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM entitlement_grants WHERE store_id = ?1 ORDER BY granted_at DESC",
            GRANT_COLS
        ),
        &[&store_id],
    )
}

// ============ Maintenance ============

/// Clear pending slots for checkouts that never completed.
/// Committed orders are unaffected (the commit already cleared the slot).
/// Returns the number of cleared slots.
pub fn purge_stale_pending_orders(conn: &Connection, retention_days: i64) -> Result<usize> {
    let cutoff = now() - retention_days * 86400;
    let cleared = conn.execute(
        "UPDATE stores SET pending_entitlement = NULL, pending_amount = NULL, pending_created_at = NULL
         WHERE pending_entitlement IS NOT NULL AND pending_created_at < ?1",
        params![cutoff],
    )?;
    Ok(cleared)
}
