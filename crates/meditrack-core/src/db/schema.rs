//! SQLite schema definition.

/// Complete database schema for MediTrack.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'pharmacist')),
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- ============================================================================
-- Drugs (active and deleted partitions share one table)
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    manufacturer TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL,                          -- exact decimal
    stock INTEGER NOT NULL CHECK (stock >= 0),
    min_stock_threshold INTEGER NOT NULL DEFAULT 10 CHECK (min_stock_threshold >= 0),
    expiry_date TEXT NOT NULL,                    -- YYYY-MM-DD
    description TEXT,
    side_effects TEXT,
    is_locked INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    deleted_at TEXT,
    deleted_by TEXT,
    CHECK ((is_deleted = 0 AND deleted_at IS NULL) OR (is_deleted = 1 AND deleted_at IS NOT NULL))
);

-- Code is unique among active drugs only
CREATE UNIQUE INDEX IF NOT EXISTS idx_drugs_active_code ON drugs(code) WHERE is_deleted = 0;
CREATE INDEX IF NOT EXISTS idx_drugs_partition ON drugs(is_deleted, created_at);
CREATE INDEX IF NOT EXISTS idx_drugs_category ON drugs(category);
CREATE INDEX IF NOT EXISTS idx_drugs_manufacturer ON drugs(manufacturer);

-- ============================================================================
-- Modification History (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS modification_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_id TEXT NOT NULL REFERENCES drugs(id) ON DELETE CASCADE,
    timestamp TEXT NOT NULL,
    changed_by TEXT NOT NULL,
    changes TEXT NOT NULL                         -- JSON array of FieldChange
);

CREATE INDEX IF NOT EXISTS idx_logs_drug ON modification_logs(drug_id, id);

CREATE TRIGGER IF NOT EXISTS modification_logs_no_update BEFORE UPDATE ON modification_logs
BEGIN
    SELECT RAISE(ABORT, 'Modification logs are immutable');
END;

-- ============================================================================
-- Sales (Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS sales (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    total_amount TEXT NOT NULL,                   -- exact decimal
    cashier_name TEXT NOT NULL,
    customer_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sales_timestamp ON sales(timestamp);

CREATE TABLE IF NOT EXISTS sale_items (
    sale_id TEXT NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    drug_id TEXT NOT NULL,                        -- snapshot reference, survives purge
    drug_name TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    price_at_sale TEXT NOT NULL,
    total TEXT NOT NULL,
    PRIMARY KEY (sale_id, line_no)
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    fn insert_drug(conn: &Connection, id: &str, code: &str, deleted: bool) -> rusqlite::Result<usize> {
        let deleted_at: Option<&str> = if deleted { Some("2024-02-01T00:00:00Z") } else { None };
        conn.execute(
            "INSERT INTO drugs (id, code, name, price, stock, expiry_date, created_at, created_by, is_deleted, deleted_at)
             VALUES (?1, ?2, 'Test', '1.00', 1, '2025-01-01', '2024-01-01T00:00:00Z', 'admin', ?3, ?4)",
            rusqlite::params![id, code, deleted, deleted_at],
        )
    }

    #[test]
    fn test_active_code_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        insert_drug(&conn, "a", "D001", false).unwrap();
        // Second active drug with the same code is rejected
        assert!(insert_drug(&conn, "b", "D001", false).is_err());
        // A deleted drug may share the code
        assert!(insert_drug(&conn, "c", "D001", true).is_ok());
    }

    #[test]
    fn test_partition_metadata_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO drugs (id, code, name, price, stock, expiry_date, created_at, created_by, is_deleted)
             VALUES ('a', 'D001', 'Test', '1.00', 1, '2025-01-01', '2024-01-01T00:00:00Z', 'admin', 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_history_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        insert_drug(&conn, "a", "D001", false).unwrap();

        conn.execute(
            "INSERT INTO modification_logs (drug_id, timestamp, changed_by, changes) VALUES ('a', '2024-01-02T00:00:00Z', 'admin', '[]')",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE modification_logs SET changed_by = 'mallory'", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_cascades_on_purge() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        insert_drug(&conn, "a", "D001", false).unwrap();
        conn.execute(
            "INSERT INTO modification_logs (drug_id, timestamp, changed_by, changes) VALUES ('a', '2024-01-02T00:00:00Z', 'admin', '[]')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM drugs WHERE id = 'a'", []).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM modification_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
