//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::{Entitlement, EntitlementGrant, Store};

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupt data.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const STORE_COLS: &str = "id, name, vip, ad_tier, ad_expires_at, last_order_code, pending_entitlement, pending_amount, pending_created_at, created_at, updated_at";

pub const GRANT_COLS: &str = "id, store_id, entitlement, order_code, amount, granted_at";

// ============ FromRow Implementations ============

impl FromRow for Store {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        // pending_entitlement is optional - parse it if present
        let pending_entitlement: Option<Entitlement> = row
            .get::<_, Option<String>>(6)?
            .map(|s| {
                s.parse().map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        6,
                        "pending_entitlement".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })
            })
            .transpose()?;
        Ok(Store {
            id: row.get(0)?,
            name: row.get(1)?,
            vip: row.get::<_, i32>(2)? != 0,
            ad_tier: row.get(3)?,
            ad_expires_at: row.get(4)?,
            last_order_code: row.get(5)?,
            pending_entitlement,
            pending_amount: row.get(7)?,
            pending_created_at: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl FromRow for EntitlementGrant {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(EntitlementGrant {
            id: row.get(0)?,
            store_id: row.get(1)?,
            entitlement: parse_enum(row, 2, "entitlement")?,
            order_code: row.get(3)?,
            amount: row.get(4)?,
            granted_at: row.get(5)?,
        })
    }
}
