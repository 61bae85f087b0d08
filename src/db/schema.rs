use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;

        -- Stores (map locations that can buy premium placement)
        -- The pending_* columns are the single in-flight order slot per
        -- store: a new checkout overwrites them, a committed webhook clears
        -- them. Invariant: at most one pending entitlement per store.
        CREATE TABLE IF NOT EXISTS stores (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            vip INTEGER NOT NULL DEFAULT 0,
            ad_tier TEXT CHECK (ad_tier IS NULL OR ad_tier IN ('week', 'month')),
            ad_expires_at INTEGER,
            last_order_code INTEGER,
            pending_entitlement TEXT CHECK (pending_entitlement IS NULL OR pending_entitlement IN ('vip_lifetime', 'ad_week', 'ad_month')),
            pending_amount INTEGER,
            pending_created_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_stores_pending_order ON stores(last_order_code) WHERE pending_entitlement IS NOT NULL;

        -- Entitlement grants (append-only, one row per committed webhook)
        CREATE TABLE IF NOT EXISTS entitlement_grants (
            id TEXT PRIMARY KEY,
            store_id TEXT NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            entitlement TEXT NOT NULL CHECK (entitlement IN ('vip_lifetime', 'ad_week', 'ad_month')),
            order_code INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            granted_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_grants_store_time ON entitlement_grants(store_id, granted_at DESC);
        "#,
    )?;
    Ok(())
}
