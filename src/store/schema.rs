//! SQLite schema for bills, items, selections, payments and users
//!
//! Notes:
//! - Quantities are expanded at creation: one `items` row per physical unit
//! - A selection row exists only while the item is selected
//! - Payments hold the cumulative amount per (bill, user) and are upserted
//! - Users are keyed by an opaque session id; selections and payments use
//!   that session id as the user key

pub const SCHEMA: &str = r#"
-- ============================================
-- BILLS
-- ============================================

CREATE TABLE IF NOT EXISTS bills (
    id TEXT PRIMARY KEY,                   -- UUID
    restaurant TEXT NOT NULL,
    date TEXT NOT NULL,                    -- calendar date, YYYY-MM-DD
    tax REAL,                              -- NULL = payment-tracking bill
    tip REAL,
    total_amount REAL NOT NULL,            -- Σ price × quantity at creation
    status TEXT NOT NULL DEFAULT 'active', -- 'active', 'settled', 'archived'
    created_at TEXT NOT NULL,              -- RFC 3339, sortable
    created_by TEXT                        -- session id of the creator
);

-- One row per unit of quantity
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    bill_id TEXT NOT NULL,
    position INTEGER NOT NULL,             -- order on the bill
    name TEXT NOT NULL,
    price REAL NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(bill_id) REFERENCES bills(id) ON DELETE CASCADE
);

-- ============================================
-- PER-USER STATE
-- ============================================

CREATE TABLE IF NOT EXISTS selections (
    id TEXT PRIMARY KEY,
    bill_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    item_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(bill_id, user_id, item_id),
    FOREIGN KEY(bill_id) REFERENCES bills(id) ON DELETE CASCADE,
    FOREIGN KEY(item_id) REFERENCES items(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    bill_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    amount REAL NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(bill_id, user_id),
    FOREIGN KEY(bill_id) REFERENCES bills(id) ON DELETE CASCADE
);

-- ============================================
-- USERS
-- ============================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_bills_created ON bills(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_items_bill ON items(bill_id, position);
CREATE INDEX IF NOT EXISTS idx_selections_bill_user ON selections(bill_id, user_id);
CREATE INDEX IF NOT EXISTS idx_selections_item ON selections(item_id);
"#;
