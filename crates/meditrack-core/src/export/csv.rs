//! CSV export of drug listings.

use chrono::NaiveDate;

use crate::db::format_date;
use crate::models::{display_amount, Drug};

/// Column headers, in output order.
pub const CSV_HEADERS: [&str; 9] = [
    "code",
    "name",
    "category",
    "manufacturer",
    "price",
    "stock",
    "min_stock_threshold",
    "expiry_date",
    "description",
];

/// Render drugs as CSV with a header row.
pub fn drugs_to_csv(drugs: &[Drug]) -> String {
    let mut csv = String::new();

    // Header
    csv.push_str(&CSV_HEADERS.join(","));
    csv.push('\n');

    for drug in drugs {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            escape_csv(&drug.code),
            escape_csv(&drug.name),
            escape_csv(&drug.category),
            escape_csv(&drug.manufacturer),
            display_amount(drug.price),
            drug.stock,
            drug.min_stock_threshold,
            format_date(&drug.expiry_date),
            escape_csv(drug.description.as_deref().unwrap_or("")),
        ));
    }

    csv
}

/// Suggested file name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("inventory_export_{}.csv", format_date(&date))
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn make_drug(code: &str, name: &str, description: Option<&str>) -> Drug {
        Drug {
            id: format!("id-{}", code),
            code: code.into(),
            name: name.into(),
            category: "Pain".into(),
            manufacturer: "Bayer".into(),
            price: Decimal::new(35, 1),
            stock: 12,
            min_stock_threshold: 10,
            expiry_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: description.map(String::from),
            side_effects: None,
            is_locked: false,
            created_at: Utc::now(),
            created_by: "Admin".into(),
            deleted_at: None,
            deleted_by: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_csv_rows() {
        let csv = drugs_to_csv(&[make_drug("D1", "Aspirin", None)]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "code,name,category,manufacturer,price,stock,min_stock_threshold,expiry_date,description"
        );
        assert_eq!(lines[1], "D1,Aspirin,Pain,Bayer,3.50,12,10,2026-03-01,");
    }

    #[test]
    fn test_csv_escaping() {
        let csv = drugs_to_csv(&[make_drug("D2", "Cough, Syrup", Some("Say \"ahh\""))]);
        assert!(csv.contains("\"Cough, Syrup\""));
        assert!(csv.contains("\"Say \"\"ahh\"\"\""));
    }

    #[test]
    fn test_empty_list_has_header_only() {
        assert_eq!(drugs_to_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_file_name(date), "inventory_export_2024-05-01.csv");
    }
}
