//! Drug catalog database operations.

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Row, ToSql};

use super::{
    format_date, format_timestamp, parse_date, parse_decimal, parse_timestamp, Database, DbError,
    DbResult,
};
use crate::models::{Drug, Partition, SelectionCriterion};

const DRUG_COLUMNS: &str = r#"
    id, code, name, category, manufacturer, price, stock, min_stock_threshold,
    expiry_date, description, side_effects, is_locked, created_at, created_by,
    deleted_at, deleted_by
"#;

impl Database {
    /// Insert a new drug into the active partition.
    pub fn insert_drug(&self, drug: &Drug) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO drugs (
                id, code, name, category, manufacturer, price, stock, min_stock_threshold,
                expiry_date, description, side_effects, is_locked, is_deleted,
                created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0, ?13, ?14)
            "#,
            params![
                drug.id,
                drug.code,
                drug.name,
                drug.category,
                drug.manufacturer,
                drug.price.to_string(),
                drug.stock,
                drug.min_stock_threshold,
                format_date(&drug.expiry_date),
                drug.description,
                drug.side_effects,
                drug.is_locked,
                format_timestamp(&drug.created_at),
                drug.created_by,
            ],
        )?;
        Ok(())
    }

    /// Overwrite the tracked fields of an active drug.
    pub fn update_drug_fields(&self, drug: &Drug) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE drugs SET
                code = ?2,
                name = ?3,
                category = ?4,
                manufacturer = ?5,
                price = ?6,
                stock = ?7,
                min_stock_threshold = ?8,
                expiry_date = ?9,
                description = ?10,
                side_effects = ?11
            WHERE id = ?1 AND is_deleted = 0
            "#,
            params![
                drug.id,
                drug.code,
                drug.name,
                drug.category,
                drug.manufacturer,
                drug.price.to_string(),
                drug.stock,
                drug.min_stock_threshold,
                format_date(&drug.expiry_date),
                drug.description,
                drug.side_effects,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a drug by ID within a partition, history included.
    pub fn get_drug(&self, id: &str, partition: Partition) -> DbResult<Option<Drug>> {
        let sql = format!(
            "SELECT {} FROM drugs WHERE id = ?1 AND is_deleted = ?2",
            DRUG_COLUMNS
        );
        let row = self
            .conn
            .query_row(&sql, params![id, is_deleted(partition)], map_drug_row)
            .optional()?;

        match row {
            Some(row) => {
                let mut drug: Drug = row.try_into()?;
                drug.history = self.get_history(&drug.id)?;
                Ok(Some(drug))
            }
            None => Ok(None),
        }
    }

    /// List a partition, newest-created first.
    pub fn list_drugs(&self, partition: Partition) -> DbResult<Vec<Drug>> {
        let sql = format!(
            "SELECT {} FROM drugs WHERE is_deleted = ?1 ORDER BY created_at DESC, id",
            DRUG_COLUMNS
        );
        self.query_drugs(&sql, &[&is_deleted(partition)])
    }

    /// List active drugs whose stock is at or below their reorder threshold.
    pub fn list_low_stock_drugs(&self) -> DbResult<Vec<Drug>> {
        let sql = format!(
            r#"
            SELECT {} FROM drugs
            WHERE is_deleted = 0 AND stock <= min_stock_threshold
            ORDER BY stock ASC, code
            "#,
            DRUG_COLUMNS
        );
        self.query_drugs(&sql, &[])
    }

    /// Get the active drugs among the given IDs (unknown IDs are skipped).
    pub fn get_active_drugs_by_ids(&self, ids: &[String]) -> DbResult<Vec<Drug>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let sql = format!(
            r#"
            SELECT {} FROM drugs
            WHERE is_deleted = 0 AND id IN ({})
            ORDER BY created_at DESC, id
            "#,
            DRUG_COLUMNS,
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), map_drug_row)?;
        self.collect_drugs(rows)
    }

    /// Select active drugs matching a criterion.
    pub fn select_active_drugs(&self, criterion: &SelectionCriterion) -> DbResult<Vec<Drug>> {
        let (condition, value) = match criterion {
            SelectionCriterion::Category(category) => ("category = ?1", category.clone()),
            SelectionCriterion::Manufacturer(manufacturer) => {
                ("manufacturer = ?1", manufacturer.clone())
            }
            SelectionCriterion::CreatedBefore(date) => {
                ("created_at < ?1", format_timestamp(&start_of_day(date)))
            }
            SelectionCriterion::CreatedAfter(date) => {
                ("created_at > ?1", format_timestamp(&start_of_day(date)))
            }
        };

        let sql = format!(
            "SELECT {} FROM drugs WHERE is_deleted = 0 AND {} ORDER BY created_at DESC, id",
            DRUG_COLUMNS, condition
        );
        self.query_drugs(&sql, &[&value])
    }

    /// Check whether an active drug other than `excluding_id` uses `code`.
    pub fn active_code_exists(&self, code: &str, excluding_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM drugs
            WHERE code = ?1 AND is_deleted = 0 AND (?2 IS NULL OR id != ?2)
            "#,
            params![code, excluding_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Set the lock flag on an active drug.
    pub fn set_drug_locked(&self, id: &str, locked: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE drugs SET is_locked = ?2 WHERE id = ?1 AND is_deleted = 0",
            params![id, locked],
        )?;
        Ok(rows_affected > 0)
    }

    /// Move an unlocked active drug into the deleted partition.
    pub fn mark_drug_deleted(&self, id: &str, at: &DateTime<Utc>, by: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE drugs SET is_deleted = 1, deleted_at = ?2, deleted_by = ?3
            WHERE id = ?1 AND is_deleted = 0 AND is_locked = 0
            "#,
            params![id, format_timestamp(at), by],
        )?;
        Ok(rows_affected > 0)
    }

    /// Move a deleted drug back into the active partition.
    pub fn mark_drug_restored(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE drugs SET is_deleted = 0, deleted_at = NULL, deleted_by = NULL
            WHERE id = ?1 AND is_deleted = 1
            "#,
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Permanently remove a drug from the deleted partition.
    pub fn purge_drug(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM drugs WHERE id = ?1 AND is_deleted = 1", [id])?;
        Ok(rows_affected > 0)
    }

    /// Decrement stock on an active drug, refusing to go below zero.
    ///
    /// Returns `false` when the drug is missing or holds less than `quantity`.
    pub fn decrement_stock(&self, id: &str, quantity: u32) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE drugs SET stock = stock - ?2
            WHERE id = ?1 AND is_deleted = 0 AND stock >= ?2
            "#,
            params![id, quantity],
        )?;
        Ok(rows_affected > 0)
    }

    fn query_drugs(&self, sql: &str, params: &[&dyn ToSql]) -> DbResult<Vec<Drug>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_drug_row)?;
        self.collect_drugs(rows)
    }

    fn collect_drugs<I>(&self, rows: I) -> DbResult<Vec<Drug>>
    where
        I: Iterator<Item = rusqlite::Result<DrugRow>>,
    {
        let mut drugs = Vec::new();
        for row in rows {
            let mut drug: Drug = row?.try_into()?;
            drug.history = self.get_history(&drug.id)?;
            drugs.push(drug);
        }
        Ok(drugs)
    }
}

fn is_deleted(partition: Partition) -> bool {
    matches!(partition, Partition::Deleted)
}

fn start_of_day(date: &chrono::NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Intermediate row struct for database mapping.
struct DrugRow {
    id: String,
    code: String,
    name: String,
    category: String,
    manufacturer: String,
    price: String,
    stock: u32,
    min_stock_threshold: u32,
    expiry_date: String,
    description: Option<String>,
    side_effects: Option<String>,
    is_locked: bool,
    created_at: String,
    created_by: String,
    deleted_at: Option<String>,
    deleted_by: Option<String>,
}

fn map_drug_row(row: &Row<'_>) -> rusqlite::Result<DrugRow> {
    Ok(DrugRow {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        manufacturer: row.get(4)?,
        price: row.get(5)?,
        stock: row.get(6)?,
        min_stock_threshold: row.get(7)?,
        expiry_date: row.get(8)?,
        description: row.get(9)?,
        side_effects: row.get(10)?,
        is_locked: row.get(11)?,
        created_at: row.get(12)?,
        created_by: row.get(13)?,
        deleted_at: row.get(14)?,
        deleted_by: row.get(15)?,
    })
}

impl TryFrom<DrugRow> for Drug {
    type Error = DbError;

    fn try_from(row: DrugRow) -> Result<Self, Self::Error> {
        Ok(Drug {
            id: row.id,
            code: row.code,
            name: row.name,
            category: row.category,
            manufacturer: row.manufacturer,
            price: parse_decimal(&row.price)?,
            stock: row.stock,
            min_stock_threshold: row.min_stock_threshold,
            expiry_date: parse_date(&row.expiry_date)?,
            description: row.description,
            side_effects: row.side_effects,
            is_locked: row.is_locked,
            created_at: parse_timestamp(&row.created_at)?,
            created_by: row.created_by,
            deleted_at: row.deleted_at.as_deref().map(parse_timestamp).transpose()?,
            deleted_by: row.deleted_by,
            history: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_drug(id: &str, code: &str, created_at: &str) -> Drug {
        Drug {
            id: id.into(),
            code: code.into(),
            name: format!("Drug {}", code),
            category: "Antibiotic".into(),
            manufacturer: "Acme".into(),
            price: Decimal::new(1250, 2),
            stock: 20,
            min_stock_threshold: 10,
            expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            description: Some("Capsules".into()),
            side_effects: None,
            is_locked: false,
            created_at: parse_timestamp(created_at).unwrap(),
            created_by: "Admin".into(),
            deleted_at: None,
            deleted_by: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let drug = make_drug("a", "D001", "2024-01-01T08:00:00Z");
        db.insert_drug(&drug).unwrap();

        let retrieved = db.get_drug("a", Partition::Active).unwrap().unwrap();
        assert_eq!(retrieved, drug);
        assert!(db.get_drug("a", Partition::Deleted).unwrap().is_none());
    }

    #[test]
    fn test_price_stored_exactly() {
        let db = setup_db();
        let mut drug = make_drug("a", "D001", "2024-01-01T08:00:00Z");
        drug.price = Decimal::new(1999, 2);
        db.insert_drug(&drug).unwrap();

        let retrieved = db.get_drug("a", Partition::Active).unwrap().unwrap();
        assert_eq!(retrieved.price.to_string(), "19.99");
    }

    #[test]
    fn test_delete_restore_purge_partitions() {
        let db = setup_db();
        db.insert_drug(&make_drug("a", "D001", "2024-01-01T08:00:00Z")).unwrap();

        assert!(db.mark_drug_deleted("a", &Utc::now(), "Li").unwrap());
        assert!(db.list_drugs(Partition::Active).unwrap().is_empty());
        let deleted = db.get_drug("a", Partition::Deleted).unwrap().unwrap();
        assert_eq!(deleted.deleted_by.as_deref(), Some("Li"));

        // Active-only operations no longer see it
        assert!(!db.mark_drug_deleted("a", &Utc::now(), "Li").unwrap());
        assert!(!db.set_drug_locked("a", true).unwrap());

        assert!(db.mark_drug_restored("a").unwrap());
        let restored = db.get_drug("a", Partition::Active).unwrap().unwrap();
        assert!(restored.deleted_at.is_none());
        assert!(restored.deleted_by.is_none());

        // Purge only touches the deleted partition
        assert!(!db.purge_drug("a").unwrap());
        db.mark_drug_deleted("a", &Utc::now(), "Li").unwrap();
        assert!(db.purge_drug("a").unwrap());
        assert!(db.get_drug("a", Partition::Deleted).unwrap().is_none());
    }

    #[test]
    fn test_locked_drug_not_deleted() {
        let db = setup_db();
        db.insert_drug(&make_drug("a", "D001", "2024-01-01T08:00:00Z")).unwrap();
        db.set_drug_locked("a", true).unwrap();

        assert!(!db.mark_drug_deleted("a", &Utc::now(), "Li").unwrap());
        assert!(db.get_drug("a", Partition::Active).unwrap().unwrap().is_locked);
    }

    #[test]
    fn test_active_code_exists() {
        let db = setup_db();
        db.insert_drug(&make_drug("a", "D001", "2024-01-01T08:00:00Z")).unwrap();

        assert!(db.active_code_exists("D001", None).unwrap());
        assert!(!db.active_code_exists("D001", Some("a")).unwrap());
        assert!(!db.active_code_exists("D002", None).unwrap());

        db.mark_drug_deleted("a", &Utc::now(), "Li").unwrap();
        assert!(!db.active_code_exists("D001", None).unwrap());
    }

    #[test]
    fn test_select_by_criterion() {
        let db = setup_db();
        let mut a = make_drug("a", "D001", "2024-01-10T08:00:00Z");
        a.category = "Cold".into();
        let mut b = make_drug("b", "D002", "2024-01-15T00:00:00Z");
        b.manufacturer = "Bayer".into();
        let c = make_drug("c", "D003", "2024-01-20T12:00:00Z");
        db.insert_drug(&a).unwrap();
        db.insert_drug(&b).unwrap();
        db.insert_drug(&c).unwrap();

        let cold = db
            .select_active_drugs(&SelectionCriterion::Category("Cold".into()))
            .unwrap();
        assert_eq!(cold.len(), 1);
        assert_eq!(cold[0].id, "a");

        let bayer = db
            .select_active_drugs(&SelectionCriterion::Manufacturer("Bayer".into()))
            .unwrap();
        assert_eq!(bayer.len(), 1);
        assert_eq!(bayer[0].id, "b");

        let threshold = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let before = db
            .select_active_drugs(&SelectionCriterion::CreatedBefore(threshold))
            .unwrap();
        assert_eq!(before.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a"]);

        // Exactly midnight is neither before nor after
        let after = db
            .select_active_drugs(&SelectionCriterion::CreatedAfter(threshold))
            .unwrap();
        assert_eq!(after.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_get_active_by_ids_skips_unknown_and_deleted() {
        let db = setup_db();
        db.insert_drug(&make_drug("a", "D001", "2024-01-01T08:00:00Z")).unwrap();
        db.insert_drug(&make_drug("b", "D002", "2024-01-02T08:00:00Z")).unwrap();
        db.mark_drug_deleted("b", &Utc::now(), "Li").unwrap();

        let ids = vec!["a".to_string(), "b".to_string(), "zzz".to_string()];
        let found = db.get_active_drugs_by_ids(&ids).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
        assert!(db.get_active_drugs_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decrement_stock_guarded() {
        let db = setup_db();
        db.insert_drug(&make_drug("a", "D001", "2024-01-01T08:00:00Z")).unwrap();

        assert!(db.decrement_stock("a", 15).unwrap());
        assert!(!db.decrement_stock("a", 6).unwrap());
        assert_eq!(db.get_drug("a", Partition::Active).unwrap().unwrap().stock, 5);
    }

    #[test]
    fn test_low_stock_listing() {
        let db = setup_db();
        let mut low = make_drug("a", "D001", "2024-01-01T08:00:00Z");
        low.stock = 3;
        db.insert_drug(&low).unwrap();
        db.insert_drug(&make_drug("b", "D002", "2024-01-02T08:00:00Z")).unwrap();
        let mut at_threshold = make_drug("c", "D003", "2024-01-03T08:00:00Z");
        at_threshold.stock = at_threshold.min_stock_threshold;
        db.insert_drug(&at_threshold).unwrap();

        let result = db.list_low_stock_drugs().unwrap();
        let codes: Vec<&str> = result.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["D001", "D003"]);
    }
}
