//! Sale record database operations.

use rusqlite::{params, OptionalExtension};

use super::{format_timestamp, parse_decimal, parse_timestamp, Database, DbError, DbResult};
use crate::models::{SaleItem, SaleRecord};

impl Database {
    /// Insert a sale and its line items.
    ///
    /// Callers recording a sale wrap this together with the stock decrements
    /// in one transaction.
    pub fn insert_sale(&self, sale: &SaleRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO sales (id, timestamp, total_amount, cashier_name, customer_name)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                sale.id,
                format_timestamp(&sale.timestamp),
                sale.total_amount.to_string(),
                sale.cashier_name,
                sale.customer_name,
            ],
        )?;

        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO sale_items (
                sale_id, line_no, drug_id, drug_name, quantity, price_at_sale, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;
        for (line_no, item) in sale.items.iter().enumerate() {
            stmt.execute(params![
                sale.id,
                line_no as i64,
                item.drug_id,
                item.drug_name,
                item.quantity,
                item.price_at_sale.to_string(),
                item.total.to_string(),
            ])?;
        }
        Ok(())
    }

    /// Get a sale by ID.
    pub fn get_sale(&self, sale_id: &str) -> DbResult<Option<SaleRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, timestamp, total_amount, cashier_name, customer_name
                FROM sales
                WHERE id = ?
                "#,
                [sale_id],
                |row| {
                    Ok(SaleRow {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        total_amount: row.get(2)?,
                        cashier_name: row.get(3)?,
                        customer_name: row.get(4)?,
                    })
                },
            )
            .optional()?;

        row.map(|row| self.hydrate_sale(row)).transpose()
    }

    /// List sales, newest first.
    pub fn list_sales(&self, limit: usize, offset: usize) -> DbResult<Vec<SaleRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, timestamp, total_amount, cashier_name, customer_name
            FROM sales
            ORDER BY timestamp DESC, id
            LIMIT ? OFFSET ?
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(SaleRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                total_amount: row.get(2)?,
                cashier_name: row.get(3)?,
                customer_name: row.get(4)?,
            })
        })?;

        let mut sales = Vec::new();
        for row in rows {
            sales.push(self.hydrate_sale(row?)?);
        }
        Ok(sales)
    }

    /// Count recorded sales.
    pub fn count_sales(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn hydrate_sale(&self, row: SaleRow) -> DbResult<SaleRecord> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT drug_id, drug_name, quantity, price_at_sale, total
            FROM sale_items
            WHERE sale_id = ?
            ORDER BY line_no
            "#,
        )?;

        let items = stmt.query_map([&row.id], |r| {
            Ok(SaleItemRow {
                drug_id: r.get(0)?,
                drug_name: r.get(1)?,
                quantity: r.get(2)?,
                price_at_sale: r.get(3)?,
                total: r.get(4)?,
            })
        })?;

        let mut sale_items = Vec::new();
        for item in items {
            sale_items.push(item?.try_into()?);
        }

        Ok(SaleRecord {
            id: row.id,
            timestamp: parse_timestamp(&row.timestamp)?,
            items: sale_items,
            total_amount: parse_decimal(&row.total_amount)?,
            cashier_name: row.cashier_name,
            customer_name: row.customer_name,
        })
    }
}

/// Intermediate row struct for database mapping.
struct SaleRow {
    id: String,
    timestamp: String,
    total_amount: String,
    cashier_name: String,
    customer_name: String,
}

struct SaleItemRow {
    drug_id: String,
    drug_name: String,
    quantity: u32,
    price_at_sale: String,
    total: String,
}

impl TryFrom<SaleItemRow> for SaleItem {
    type Error = DbError;

    fn try_from(row: SaleItemRow) -> Result<Self, Self::Error> {
        Ok(SaleItem {
            drug_id: row.drug_id,
            drug_name: row.drug_name,
            quantity: row.quantity,
            price_at_sale: parse_decimal(&row.price_at_sale)?,
            total: parse_decimal(&row.total)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn make_sale(id: &str, minutes_ago: i64) -> SaleRecord {
        let items = vec![
            SaleItem::capture("drug-1", "Aspirin", Decimal::new(1600, 2), 2).unwrap(),
            SaleItem::capture("drug-2", "Vitamin C", Decimal::new(1990, 2), 1).unwrap(),
        ];
        let total_amount = items.iter().map(|i| i.total).sum();
        SaleRecord {
            id: id.into(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            items,
            total_amount,
            cashier_name: "Li".into(),
            customer_name: "Walk-in".into(),
        }
    }

    #[test]
    fn test_insert_and_get_sale() {
        let db = Database::open_in_memory().unwrap();
        let sale = make_sale("sale-1", 0);
        db.insert_sale(&sale).unwrap();

        let retrieved = db.get_sale("sale-1").unwrap().unwrap();
        assert_eq!(retrieved.items.len(), 2);
        assert_eq!(retrieved.items[0].drug_name, "Aspirin");
        assert_eq!(retrieved.total_amount, Decimal::new(5190, 2));
        assert_eq!(retrieved.id, sale.id);
    }

    #[test]
    fn test_list_sales_newest_first_with_paging() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sale(&make_sale("old", 30)).unwrap();
        db.insert_sale(&make_sale("new", 1)).unwrap();
        db.insert_sale(&make_sale("mid", 10)).unwrap();

        let all = db.list_sales(10, 0).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let page = db.list_sales(1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "mid");
        assert_eq!(db.count_sales().unwrap(), 3);
    }

    #[test]
    fn test_missing_sale() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_sale("nope").unwrap().is_none());
    }
}
