//! Modification history database operations.

use rusqlite::params;

use super::{format_timestamp, parse_timestamp, Database, DbError, DbResult};
use crate::models::{FieldChange, ModificationLog};

impl Database {
    /// Append a log entry to a drug's history.
    pub fn append_history(&self, drug_id: &str, log: &ModificationLog) -> DbResult<()> {
        let changes_json = serde_json::to_string(&log.changes)?;
        self.conn.execute(
            r#"
            INSERT INTO modification_logs (drug_id, timestamp, changed_by, changes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                drug_id,
                format_timestamp(&log.timestamp),
                log.changed_by,
                changes_json,
            ],
        )?;
        Ok(())
    }

    /// Get a drug's history, newest first.
    pub fn get_history(&self, drug_id: &str) -> DbResult<Vec<ModificationLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, changed_by, changes
            FROM modification_logs
            WHERE drug_id = ?
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map([drug_id], |row| {
            Ok(LogRow {
                timestamp: row.get(0)?,
                changed_by: row.get(1)?,
                changes: row.get(2)?,
            })
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.try_into()?);
        }
        Ok(logs)
    }
}

/// Intermediate row struct for database mapping.
struct LogRow {
    timestamp: String,
    changed_by: String,
    changes: String,
}

impl TryFrom<LogRow> for ModificationLog {
    type Error = DbError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let changes: Vec<FieldChange> = serde_json::from_str(&row.changes)?;
        Ok(ModificationLog {
            timestamp: parse_timestamp(&row.timestamp)?,
            changed_by: row.changed_by,
            changes,
        })
    }
}
