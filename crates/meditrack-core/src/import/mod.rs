//! Bulk import of drugs from comma-separated text.
//!
//! Each non-blank line is one record:
//!
//! ```text
//! code, name, category, manufacturer, price, stock, minStockThreshold, expiryDate[, description]
//! ```
//!
//! Parsing never fails as a whole. Every line gets a verdict, and only valid
//! lines are handed to batch create.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::inventory::{BatchCreateReport, Inventory};
use crate::models::{Actor, NewDrug};

/// Description given to imported drugs that carry none.
pub const DEFAULT_IMPORT_DESCRIPTION: &str = "Imported in bulk";

const REQUIRED_FIELDS: usize = 8;

/// Why a line was rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LineIssue {
    /// Fewer than eight fields
    InsufficientFields,
    /// Bad price, stock or threshold, or a blank code/name
    InvalidNumeric,
    /// Expiry date is not `YYYY-MM-DD`
    InvalidDate,
}

impl LineIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineIssue::InsufficientFields => "insufficient fields",
            LineIssue::InvalidNumeric => "invalid numeric value",
            LineIssue::InvalidDate => "invalid expiry date",
        }
    }
}

/// Verdict for one parsed line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum LineVerdict {
    Valid(NewDrug),
    Invalid(LineIssue),
}

/// A parsed input line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportLine {
    /// 1-based line number in the raw input
    pub line_number: usize,
    pub raw: String,
    pub verdict: LineVerdict,
}

impl ImportLine {
    pub fn is_valid(&self) -> bool {
        matches!(self.verdict, LineVerdict::Valid(_))
    }
}

/// Result of an import: every verdict plus what batch create did with the valid lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub lines: Vec<ImportLine>,
    pub report: BatchCreateReport,
}

/// Parse a bulk text blob into per-line verdicts. Blank lines are skipped.
pub fn parse_bulk(text: &str) -> Vec<ImportLine> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, raw)| {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                return None;
            }
            Some(ImportLine {
                line_number: index + 1,
                raw: raw.to_string(),
                verdict: parse_line(raw),
            })
        })
        .collect()
}

/// Parse a single record.
pub fn parse_line(line: &str) -> LineVerdict {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < REQUIRED_FIELDS {
        return LineVerdict::Invalid(LineIssue::InsufficientFields);
    }

    let code = fields[0];
    let name = fields[1];
    let price = Decimal::from_str(fields[4]).ok().filter(|p| *p >= Decimal::ZERO);
    let stock = fields[5].parse::<u32>().ok();
    let threshold = fields[6].parse::<u32>().ok();

    let (Some(price), Some(stock), Some(threshold)) = (price, stock, threshold) else {
        return LineVerdict::Invalid(LineIssue::InvalidNumeric);
    };
    if code.is_empty() || name.is_empty() {
        return LineVerdict::Invalid(LineIssue::InvalidNumeric);
    }

    let Ok(expiry_date) = NaiveDate::parse_from_str(fields[7], "%Y-%m-%d") else {
        return LineVerdict::Invalid(LineIssue::InvalidDate);
    };

    let description = fields
        .get(8)
        .filter(|d| !d.is_empty())
        .map(|d| d.to_string())
        .unwrap_or_else(|| DEFAULT_IMPORT_DESCRIPTION.to_string());

    let mut drug = NewDrug::new(code, name, price, stock, expiry_date);
    drug.category = fields[2].to_string();
    drug.manufacturer = fields[3].to_string();
    drug.min_stock_threshold = threshold;
    drug.description = Some(description);
    LineVerdict::Valid(drug)
}

/// Parse `text` and batch-create every valid line.
pub fn import_drugs(db: &Database, text: &str, actor: &Actor) -> ImportOutcome {
    let lines = parse_bulk(text);
    let valid: Vec<NewDrug> = lines
        .iter()
        .filter_map(|line| match &line.verdict {
            LineVerdict::Valid(drug) => Some(drug.clone()),
            LineVerdict::Invalid(_) => None,
        })
        .collect();

    let report = Inventory::new(db).batch_create(valid, actor);
    info!(
        lines = lines.len(),
        created = report.created.len(),
        failed = report.failures.len(),
        actor = %actor.name,
        "imported drugs"
    );
    ImportOutcome { lines, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_line() {
        let verdict = parse_line("D009, Vitamin C, Supplement, Acme, 19.9, 100, 20, 2025-12-31");
        let LineVerdict::Valid(drug) = verdict else {
            panic!("expected valid line, got {:?}", verdict);
        };
        assert_eq!(drug.code, "D009");
        assert_eq!(drug.name, "Vitamin C");
        assert_eq!(drug.category, "Supplement");
        assert_eq!(drug.price, Decimal::new(199, 1));
        assert_eq!(drug.stock, 100);
        assert_eq!(drug.min_stock_threshold, 20);
        assert_eq!(drug.description.as_deref(), Some(DEFAULT_IMPORT_DESCRIPTION));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            parse_line("D009, Vitamin C"),
            LineVerdict::Invalid(LineIssue::InsufficientFields)
        );
        assert_eq!(
            parse_line("D009, Vitamin C, Supplement, Acme, abc, 100, 20, 2025-12-31"),
            LineVerdict::Invalid(LineIssue::InvalidNumeric)
        );
        assert_eq!(
            parse_line(", Vitamin C, Supplement, Acme, 1.00, 100, 20, 2025-12-31"),
            LineVerdict::Invalid(LineIssue::InvalidNumeric)
        );
        assert_eq!(
            parse_line("D009, Vitamin C, Supplement, Acme, 1.00, -4, 20, 2025-12-31"),
            LineVerdict::Invalid(LineIssue::InvalidNumeric)
        );
        assert_eq!(
            parse_line("D009, Vitamin C, Supplement, Acme, 1.00, 4, 20, 31/12/2025"),
            LineVerdict::Invalid(LineIssue::InvalidDate)
        );
    }

    #[test]
    fn test_ninth_field_is_description() {
        let verdict = parse_line("D1, Aspirin, Pain, Bayer, 3.50, 10, 5, 2026-01-01, Chewable tablets");
        let LineVerdict::Valid(drug) = verdict else {
            panic!("expected valid line");
        };
        assert_eq!(drug.description.as_deref(), Some("Chewable tablets"));
    }

    #[test]
    fn test_blank_lines_skipped_and_numbered() {
        let text = "D1, A, C, M, 1, 1, 1, 2026-01-01\r\n\n   \nD2, B\n";
        let lines = parse_bulk(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert!(lines[0].is_valid());
        assert_eq!(lines[1].line_number, 4);
        assert_eq!(lines[1].raw, "D2, B");
        assert!(!lines[1].is_valid());
    }
}
