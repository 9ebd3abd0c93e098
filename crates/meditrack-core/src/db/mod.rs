//! Database layer for MediTrack.

mod schema;
mod drugs;
mod history;
mod sales;
mod users;

pub use schema::*;
#[allow(unused_imports)]
pub use drugs::*;
#[allow(unused_imports)]
pub use sales::*;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction that takes the database lock immediately.
    ///
    /// Statements issued through `self` while the guard is alive run inside
    /// the transaction. Dropping the guard without `commit` rolls back.
    pub fn begin_immediate(&self) -> DbResult<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

/// Current time truncated to the stored precision.
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp in the stored, lexicographically ordered form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidValue(format!("timestamp {:?}: {}", s, e)))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(s: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::InvalidValue(format!("date {:?}: {}", s, e)))
}

pub(crate) fn parse_decimal(s: &str) -> DbResult<Decimal> {
    Decimal::from_str(s).map_err(|e| DbError::InvalidValue(format!("decimal {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"drugs".to_string()));
        assert!(tables.contains(&"modification_logs".to_string()));
        assert!(tables.contains(&"sales".to_string()));
        assert!(tables.contains(&"sale_items".to_string()));
        assert!(tables.contains(&"users".to_string()));
    }

    #[test]
    fn test_open_file_twice_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meditrack.db");

        Database::open(&path).unwrap();
        let reopened = Database::open(&path);
        assert!(reopened.is_ok());
    }

    #[test]
    fn test_uncommitted_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        {
            let _tx = db.begin_immediate().unwrap();
            db.conn()
                .execute(
                    "INSERT INTO users (id, username, name, role, password_hash, created_at)
                     VALUES ('u1', 'pharm', 'Li', 'pharmacist', 'x', '2024-01-01T00:00:00Z')",
                    [],
                )
                .unwrap();
        }
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_timestamp_format_is_sortable() {
        let early = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2024-01-01T10:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(format_timestamp(&early) < format_timestamp(&late));
        assert_eq!(parse_timestamp(&format_timestamp(&late)).unwrap(), late);
    }
}
