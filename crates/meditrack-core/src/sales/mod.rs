//! Sale transaction engine.
//!
//! A sale is all-or-nothing: the sale record and every stock decrement commit
//! in one immediate transaction, or none of them do.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{current_timestamp, Database, DbError};
use crate::models::{resolve_customer_name, Actor, CartLine, Partition, SaleItem, SaleRecord};

/// Sale validation and persistence errors.
#[derive(Error, Debug)]
pub enum SaleError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity for drug {0}")]
    InvalidQuantity(String),

    #[error("Sale amount out of range for {0}")]
    AmountOverflow(String),

    #[error("Drug not found: {0}")]
    DrugNotFound(String),

    #[error("Insufficient stock for {drug_name}: {available} available, {requested} requested")]
    InsufficientStock {
        drug_name: String,
        available: u32,
        requested: u32,
    },
}

pub type SaleResult<T> = Result<T, SaleError>;

/// Sale transaction engine.
pub struct SalesEngine<'a> {
    db: &'a Database,
}

impl<'a> SalesEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a sale and decrement stock for every line.
    ///
    /// Prices are captured from the drugs at sale time. Repeated lines for one
    /// drug are checked against stock together.
    pub fn record_sale(
        &self,
        items: &[CartLine],
        customer_name: Option<&str>,
        actor: &Actor,
    ) -> SaleResult<SaleRecord> {
        if items.is_empty() {
            return Err(SaleError::EmptyCart);
        }
        if let Some(line) = items.iter().find(|line| line.quantity == 0) {
            return Err(SaleError::InvalidQuantity(line.drug_id.clone()));
        }

        let tx = self.db.begin_immediate()?;

        let mut requested: HashMap<&str, u32> = HashMap::new();
        for line in items {
            let total = requested.entry(line.drug_id.as_str()).or_default();
            *total = total
                .checked_add(line.quantity)
                .ok_or_else(|| SaleError::InvalidQuantity(line.drug_id.clone()))?;
        }

        let mut sale_items = Vec::with_capacity(items.len());
        for line in items {
            let drug = self
                .db
                .get_drug(&line.drug_id, Partition::Active)?
                .ok_or_else(|| SaleError::DrugNotFound(line.drug_id.clone()))?;

            let wanted = requested
                .get(line.drug_id.as_str())
                .copied()
                .unwrap_or(line.quantity);
            if wanted > drug.stock {
                warn!(
                    drug_id = %drug.id,
                    available = drug.stock,
                    requested = wanted,
                    "rejected sale, insufficient stock"
                );
                return Err(SaleError::InsufficientStock {
                    drug_name: drug.name,
                    available: drug.stock,
                    requested: wanted,
                });
            }
            let item = SaleItem::capture(&drug.id, &drug.name, drug.price, line.quantity)
                .ok_or_else(|| SaleError::AmountOverflow(drug.name.clone()))?;
            sale_items.push(item);
        }

        let total_amount = sale_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
            .ok_or_else(|| SaleError::AmountOverflow("sale total".into()))?;
        let sale = SaleRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: current_timestamp(),
            items: sale_items,
            total_amount,
            cashier_name: actor.name.clone(),
            customer_name: resolve_customer_name(customer_name),
        };

        self.db.insert_sale(&sale)?;
        for item in &sale.items {
            if !self.db.decrement_stock(&item.drug_id, item.quantity)? {
                // Guard in SQL disagrees with the check above; drop rolls back
                return Err(SaleError::InsufficientStock {
                    drug_name: item.drug_name.clone(),
                    available: 0,
                    requested: item.quantity,
                });
            }
        }
        tx.commit().map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            lines = sale.items.len(),
            total = %sale.total_amount,
            cashier = %sale.cashier_name,
            "recorded sale"
        );
        Ok(sale)
    }

    /// List sales, newest first.
    pub fn list_sales(&self, limit: usize, offset: usize) -> SaleResult<Vec<SaleRecord>> {
        Ok(self.db.list_sales(limit, offset)?)
    }

    /// Get a sale by ID.
    pub fn get_sale(&self, id: &str) -> SaleResult<Option<SaleRecord>> {
        Ok(self.db.get_sale(id)?)
    }
}
