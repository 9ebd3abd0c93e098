//! Drug catalog models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::history::ModificationLog;

/// Default low-stock warning threshold for new drugs.
pub const DEFAULT_MIN_STOCK_THRESHOLD: u32 = 10;

/// A single drug in the pharmacy catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    /// Opaque unique ID
    pub id: String,
    /// Human-facing code, unique among active drugs
    pub code: String,
    /// Display name
    pub name: String,
    /// Therapeutic category (e.g., "Antibiotic")
    pub category: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Unit price
    pub price: Decimal,
    /// Units on hand
    pub stock: u32,
    /// Stock level below which the drug is flagged for reorder
    pub min_stock_threshold: u32,
    /// Expiry date of the current batch
    pub expiry_date: NaiveDate,
    /// Free-text description
    pub description: Option<String>,
    /// Known side effects
    pub side_effects: Option<String>,
    /// When true the drug cannot be soft-deleted
    pub is_locked: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Name of the actor who created the drug
    pub created_by: String,
    /// Set while the drug sits in the deleted partition
    pub deleted_at: Option<DateTime<Utc>>,
    /// Name of the actor who soft-deleted the drug
    pub deleted_by: Option<String>,
    /// Modification history, newest first
    pub history: Vec<ModificationLog>,
}

impl Drug {
    /// Whether the drug currently sits in the deleted partition.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether stock is at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock_threshold
    }

    /// Whether the drug is past its expiry date on the given day.
    pub fn is_expired(&self, on: NaiveDate) -> bool {
        self.expiry_date < on
    }
}

/// Which partition of the catalog a drug lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Active,
    Deleted,
}

/// Selection over the active partition used to build batch targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", content = "value", rename_all = "camelCase")]
pub enum SelectionCriterion {
    /// Exact category match
    Category(String),
    /// Exact manufacturer match
    Manufacturer(String),
    /// Created strictly before midnight UTC at the start of the date
    CreatedBefore(NaiveDate),
    /// Created strictly after midnight UTC at the start of the date
    CreatedAfter(NaiveDate),
}

/// Input for creating a drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDrug {
    pub code: String,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default = "default_threshold")]
    pub min_stock_threshold: u32,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
}

fn default_threshold() -> u32 {
    DEFAULT_MIN_STOCK_THRESHOLD
}

impl NewDrug {
    /// Create input with required fields and defaults for the rest.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        stock: u32,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: String::new(),
            manufacturer: String::new(),
            price,
            stock,
            min_stock_threshold: DEFAULT_MIN_STOCK_THRESHOLD,
            expiry_date,
            description: None,
            side_effects: None,
            is_locked: false,
        }
    }
}

/// Proposed edits to a drug's tracked fields.
///
/// `None` leaves a field untouched. The optional text fields are doubly
/// wrapped so that `Some(None)` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub min_stock_threshold: Option<u32>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub side_effects: Option<Option<String>>,
}

impl DrugPatch {
    /// Build a patch proposing every tracked field of `drug`.
    pub fn from_drug(drug: &Drug) -> Self {
        Self {
            name: Some(drug.name.clone()),
            code: Some(drug.code.clone()),
            category: Some(drug.category.clone()),
            manufacturer: Some(drug.manufacturer.clone()),
            price: Some(drug.price),
            stock: Some(drug.stock),
            min_stock_threshold: Some(drug.min_stock_threshold),
            expiry_date: Some(drug.expiry_date),
            description: Some(drug.description.clone()),
            side_effects: Some(drug.side_effects.clone()),
        }
    }

    /// Apply the patch in place.
    pub fn apply_to(&self, drug: &mut Drug) {
        if let Some(name) = &self.name {
            drug.name = name.clone();
        }
        if let Some(code) = &self.code {
            drug.code = code.clone();
        }
        if let Some(category) = &self.category {
            drug.category = category.clone();
        }
        if let Some(manufacturer) = &self.manufacturer {
            drug.manufacturer = manufacturer.clone();
        }
        if let Some(price) = self.price {
            drug.price = price;
        }
        if let Some(stock) = self.stock {
            drug.stock = stock;
        }
        if let Some(threshold) = self.min_stock_threshold {
            drug.min_stock_threshold = threshold;
        }
        if let Some(expiry) = self.expiry_date {
            drug.expiry_date = expiry;
        }
        if let Some(description) = &self.description {
            drug.description = description.clone();
        }
        if let Some(side_effects) = &self.side_effects {
            drug.side_effects = side_effects.clone();
        }
    }
}
