//! Sale transaction models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer label used when a sale carries no customer name.
pub const WALK_IN_CUSTOMER: &str = "Walk-in";

/// A requested cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub drug_id: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(drug_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            drug_id: drug_id.into(),
            quantity,
        }
    }
}

/// A completed, immutable sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Unique sale ID
    pub id: String,
    /// When the sale was recorded
    pub timestamp: DateTime<Utc>,
    /// Line snapshots, in cart order
    pub items: Vec<SaleItem>,
    /// Exact sum of line totals
    pub total_amount: Decimal,
    /// Actor who rang up the sale
    pub cashier_name: String,
    /// Customer name, or the walk-in label
    pub customer_name: String,
}

/// One line of a sale, captured at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub drug_id: String,
    /// Drug name when sold (not live-joined)
    pub drug_name: String,
    pub quantity: u32,
    /// Unit price when sold
    pub price_at_sale: Decimal,
    pub total: Decimal,
}

impl SaleItem {
    /// Capture a line from the drug's current name and price.
    ///
    /// Returns `None` if the line total does not fit in a `Decimal`.
    pub fn capture(drug_id: &str, drug_name: &str, price: Decimal, quantity: u32) -> Option<Self> {
        let total = price.checked_mul(Decimal::from(quantity))?;
        Some(Self {
            drug_id: drug_id.to_string(),
            drug_name: drug_name.to_string(),
            quantity,
            price_at_sale: price,
            total,
        })
    }
}

/// Resolve the stored customer name, falling back to the walk-in label.
pub fn resolve_customer_name(customer_name: Option<&str>) -> String {
    match customer_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => WALK_IN_CUSTOMER.to_string(),
    }
}

/// Format a monetary amount for display, rounded half away from zero to two places.
pub fn display_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    )
}
