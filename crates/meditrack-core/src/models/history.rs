//! Audit history models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::drug::Drug;

/// A drug attribute whose edits are recorded in history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TrackedField {
    Name,
    Code,
    Category,
    Manufacturer,
    Price,
    Stock,
    MinStockThreshold,
    ExpiryDate,
    Description,
    SideEffects,
}

impl TrackedField {
    /// All tracked fields, in diff order.
    pub const ALL: [TrackedField; 10] = [
        TrackedField::Name,
        TrackedField::Code,
        TrackedField::Category,
        TrackedField::Manufacturer,
        TrackedField::Price,
        TrackedField::Stock,
        TrackedField::MinStockThreshold,
        TrackedField::ExpiryDate,
        TrackedField::Description,
        TrackedField::SideEffects,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::Name => "name",
            TrackedField::Code => "code",
            TrackedField::Category => "category",
            TrackedField::Manufacturer => "manufacturer",
            TrackedField::Price => "price",
            TrackedField::Stock => "stock",
            TrackedField::MinStockThreshold => "minStockThreshold",
            TrackedField::ExpiryDate => "expiryDate",
            TrackedField::Description => "description",
            TrackedField::SideEffects => "sideEffects",
        }
    }

    /// Read this field's current value from a drug.
    pub fn value_of(&self, drug: &Drug) -> FieldValue {
        match self {
            TrackedField::Name => FieldValue::Text(drug.name.clone()),
            TrackedField::Code => FieldValue::Text(drug.code.clone()),
            TrackedField::Category => FieldValue::Text(drug.category.clone()),
            TrackedField::Manufacturer => FieldValue::Text(drug.manufacturer.clone()),
            TrackedField::Price => FieldValue::Decimal(drug.price),
            TrackedField::Stock => FieldValue::Integer(i64::from(drug.stock)),
            TrackedField::MinStockThreshold => {
                FieldValue::Integer(i64::from(drug.min_stock_threshold))
            }
            TrackedField::ExpiryDate => FieldValue::Date(drug.expiry_date),
            TrackedField::Description => FieldValue::from(drug.description.clone()),
            TrackedField::SideEffects => FieldValue::from(drug.side_effects.clone()),
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed value of a tracked field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Decimal(Decimal),
    Integer(i64),
    Date(NaiveDate),
    /// A cleared optional text field
    Empty,
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Empty)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// A single field delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
}

/// One immutable entry in a drug's modification history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModificationLog {
    pub timestamp: DateTime<Utc>,
    pub changed_by: String,
    pub changes: Vec<FieldChange>,
}
