//! MediTrack Core Library
//!
//! Local-first pharmacy inventory and point-of-sale tracking.
//!
//! # Architecture
//!
//! ```text
//!            Actor {id, name, role}  (resolved by auth, passed to every call)
//!                          │
//!      ┌───────────────────┼────────────────────┬──────────────────┐
//!      ▼                   ▼                    ▼                  ▼
//!  Bulk Import ──▶ Batch Coordinator     Lifecycle Manager    Sale Engine
//!  (per-line        (create/delete          │        │        (validate,
//!   verdicts)        by criterion)          │        │         capture price)
//!                          │                ▼        │              │
//!                          └───────▶ Change-Diff     │              │
//!                                    Engine          │              │
//!                                      │             │              │
//!                          ┌───────────▼─────────────▼──────────────▼──┐
//!                          │      SQLite store (BEGIN IMMEDIATE)       │
//!                          │  drugs │ modification_logs │ sales │ users│
//!                          └───────────────────┬───────────────────────┘
//!                                              │
//!                                         CSV Export
//! ```
//!
//! # Core Principle
//!
//! **Every stock-affecting write is atomic.** A sale commits its record and all
//! stock decrements together, and history is only ever appended.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Drug, ModificationLog, SaleRecord, User, etc.)
//! - [`audit`]: Change-diff engine for modification history
//! - [`inventory`]: Drug lifecycle manager and batch operations
//! - [`sales`]: Sale transaction engine
//! - [`import`]: Bulk import parser
//! - [`export`]: CSV export
//! - [`auth`]: Password hashing and user registration
//! - [`api`]: Response envelope

pub mod api;
pub mod audit;
pub mod auth;
pub mod db;
pub mod export;
pub mod import;
pub mod inventory;
pub mod models;
pub mod sales;

// Re-export commonly used types
pub use api::ApiResponse;
pub use db::Database;
pub use import::{ImportLine, ImportOutcome, LineIssue, LineVerdict};
pub use inventory::{BatchCreateReport, BatchDeleteOutcome, Inventory, InventoryError};
pub use models::{
    Actor, CartLine, Drug, DrugPatch, FieldChange, FieldValue, ModificationLog, NewDrug,
    Partition, Role, SaleItem, SaleRecord, SelectionCriterion, TrackedField, User,
};
pub use sales::{SaleError, SalesEngine};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MediTrackError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("No match: {0}")]
    NoMatch(String),

    #[error("All locked: {0}")]
    AllLocked(String),

    #[error("Sale rejected: {0}")]
    SaleRejected(String),

    #[error("Authentication error: {0}")]
    AuthError(String),
}

impl From<db::DbError> for MediTrackError {
    fn from(e: db::DbError) -> Self {
        MediTrackError::DatabaseError(e.to_string())
    }
}

impl From<InventoryError> for MediTrackError {
    fn from(e: InventoryError) -> Self {
        let message = e.to_string();
        match e {
            InventoryError::Database(_) => MediTrackError::DatabaseError(message),
            InventoryError::NotFound(_) => MediTrackError::NotFound(message),
            InventoryError::DuplicateCode(_) => MediTrackError::DuplicateCode(message),
            InventoryError::Locked(_) => MediTrackError::Locked(message),
            InventoryError::Forbidden(_) => MediTrackError::Forbidden(message),
            InventoryError::InvalidInput(_) => MediTrackError::InvalidInput(message),
            InventoryError::NoMatch => MediTrackError::NoMatch(message),
            InventoryError::AllLocked => MediTrackError::AllLocked(message),
        }
    }
}

impl From<SaleError> for MediTrackError {
    fn from(e: SaleError) -> Self {
        let message = e.to_string();
        match e {
            SaleError::Database(_) => MediTrackError::DatabaseError(message),
            SaleError::DrugNotFound(_) => MediTrackError::NotFound(message),
            _ => MediTrackError::SaleRejected(message),
        }
    }
}

impl From<auth::AuthError> for MediTrackError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::UserNotFound(id) => {
                MediTrackError::NotFound(format!("User not found: {}", id))
            }
            auth::AuthError::Database(db) => db.into(),
            auth::AuthError::InvalidInput(msg) => MediTrackError::InvalidInput(msg),
            other => MediTrackError::AuthError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MediTrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MediTrackError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<MediTrackCore>, MediTrackError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(MediTrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<MediTrackCore>, MediTrackError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MediTrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Parse bulk import text without touching any database.
#[uniffi::export]
pub fn preview_import(text: String) -> Vec<FfiImportLine> {
    import::parse_bulk(&text).into_iter().map(|l| l.into()).collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MediTrackCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl MediTrackCore {
    // =========================================================================
    // Drug Operations
    // =========================================================================

    /// List the active or deleted partition, newest first.
    pub fn list_drugs(&self, deleted: bool) -> Result<Vec<FfiDrug>, MediTrackError> {
        let db = self.db.lock()?;
        let drugs = Inventory::new(&db).list(partition(deleted))?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    /// List active drugs below their reorder threshold.
    pub fn list_low_stock_drugs(&self) -> Result<Vec<FfiDrug>, MediTrackError> {
        let db = self.db.lock()?;
        let drugs = Inventory::new(&db).low_stock()?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    /// Get a drug by ID from one partition.
    pub fn get_drug(&self, id: String, deleted: bool) -> Result<Option<FfiDrug>, MediTrackError> {
        let db = self.db.lock()?;
        let drug = db.get_drug(&id, partition(deleted))?;
        Ok(drug.map(|d| d.into()))
    }

    /// Create a drug.
    pub fn create_drug(
        &self,
        input: FfiNewDrug,
        actor: FfiActor,
    ) -> Result<FfiDrug, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let input = NewDrug::try_from(input)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).create(input, &actor)?.into())
    }

    /// Update tracked fields of an active drug.
    pub fn update_drug(
        &self,
        id: String,
        patch: FfiDrugPatch,
        actor: FfiActor,
    ) -> Result<FfiDrug, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let patch = DrugPatch::try_from(patch)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).update(&id, &patch, &actor)?.into())
    }

    /// Flip a drug's lock flag, returning the new state.
    pub fn toggle_drug_lock(&self, id: String, actor: FfiActor) -> Result<bool, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).toggle_lock(&id, &actor)?)
    }

    /// Soft-delete a drug.
    pub fn delete_drug(&self, id: String, actor: FfiActor) -> Result<FfiDrug, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).soft_delete(&id, &actor)?.into())
    }

    /// Restore a soft-deleted drug.
    pub fn restore_drug(&self, id: String) -> Result<FfiDrug, MediTrackError> {
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).restore(&id)?.into())
    }

    /// Permanently remove a soft-deleted drug.
    pub fn purge_drug(&self, id: String, actor: FfiActor) -> Result<(), MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).purge_deleted(&id, &actor)?)
    }

    /// Soft-delete the unlocked drugs among `ids`.
    pub fn batch_delete_drugs(
        &self,
        ids: Vec<String>,
        actor: FfiActor,
    ) -> Result<FfiBatchDeleteOutcome, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db).batch_delete(&ids, &actor)?.into())
    }

    /// Soft-delete the unlocked drugs matching a criterion.
    pub fn batch_delete_matching(
        &self,
        criterion: FfiSelectionCriterion,
        actor: FfiActor,
    ) -> Result<FfiBatchDeleteOutcome, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let criterion = SelectionCriterion::try_from(criterion)?;
        let db = self.db.lock()?;
        Ok(Inventory::new(&db)
            .batch_delete_matching(&criterion, &actor)?
            .into())
    }

    // =========================================================================
    // Sale Operations
    // =========================================================================

    /// Record a sale.
    pub fn record_sale(
        &self,
        items: Vec<FfiCartLine>,
        customer_name: Option<String>,
        actor: FfiActor,
    ) -> Result<FfiSale, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let lines: Vec<CartLine> = items.into_iter().map(|l| l.into()).collect();
        let db = self.db.lock()?;
        let sale = SalesEngine::new(&db).record_sale(&lines, customer_name.as_deref(), &actor)?;
        Ok(sale.into())
    }

    /// List sales, newest first.
    pub fn list_sales(&self, limit: u32, offset: u32) -> Result<Vec<FfiSale>, MediTrackError> {
        let db = self.db.lock()?;
        let sales = SalesEngine::new(&db).list_sales(limit as usize, offset as usize)?;
        Ok(sales.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// Parse bulk text and create every valid line.
    pub fn import_drugs(
        &self,
        text: String,
        actor: FfiActor,
    ) -> Result<FfiImportResult, MediTrackError> {
        let actor = Actor::try_from(actor)?;
        let db = self.db.lock()?;
        Ok(import::import_drugs(&db, &text, &actor).into())
    }

    /// Export a partition as CSV.
    pub fn export_drugs_csv(&self, deleted: bool) -> Result<String, MediTrackError> {
        let db = self.db.lock()?;
        let drugs = Inventory::new(&db).list(partition(deleted))?;
        Ok(export::drugs_to_csv(&drugs))
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a staff account.
    pub fn register_user(
        &self,
        username: String,
        name: String,
        role: String,
        password: String,
    ) -> Result<FfiActor, MediTrackError> {
        let role = Role::from_str(&role).map_err(MediTrackError::InvalidInput)?;
        let db = self.db.lock()?;
        let user = auth::register_user(&db, &username, &name, role, &password, auth::DEFAULT_COST)?;
        Ok(user.actor().into())
    }

    /// Check credentials and return the acting identity.
    pub fn authenticate(&self, username: String, password: String) -> Result<FfiActor, MediTrackError> {
        let db = self.db.lock()?;
        Ok(auth::authenticate(&db, &username, &password)?.into())
    }

    /// The stored account behind an actor.
    pub fn current_user(&self, actor: FfiActor) -> Result<FfiUser, MediTrackError> {
        let db = self.db.lock()?;
        Ok(auth::current_user(&db, &actor.id)?.into())
    }

    /// Update the actor's own display name and/or password.
    pub fn update_profile(
        &self,
        actor: FfiActor,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<FfiUser, MediTrackError> {
        let db = self.db.lock()?;
        let user = auth::update_profile(
            &db,
            &actor.id,
            name.as_deref(),
            password.as_deref(),
            auth::DEFAULT_COST,
        )?;
        Ok(user.into())
    }
}

fn partition(deleted: bool) -> Partition {
    if deleted {
        Partition::Deleted
    } else {
        Partition::Active
    }
}

fn parse_money(field: &str, value: &str) -> Result<Decimal, MediTrackError> {
    Decimal::from_str(value.trim())
        .map_err(|_| MediTrackError::InvalidInput(format!("{} is not a decimal: {}", field, value)))
}

fn parse_day(field: &str, value: &str) -> Result<NaiveDate, MediTrackError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| MediTrackError::InvalidInput(format!("{} is not YYYY-MM-DD: {}", field, value)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe acting identity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiActor {
    pub id: String,
    pub name: String,
    /// "admin" or "pharmacist"
    pub role: String,
}

impl From<Actor> for FfiActor {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
            role: actor.role.as_str().to_string(),
        }
    }
}

impl TryFrom<FfiActor> for Actor {
    type Error = MediTrackError;

    fn try_from(actor: FfiActor) -> Result<Self, Self::Error> {
        let role = Role::from_str(&actor.role).map_err(MediTrackError::InvalidInput)?;
        Ok(Actor::new(actor.id, actor.name, role))
    }
}

/// FFI-safe staff account, without the credential hash.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// FFI-safe drug. Money and dates are strings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub price: String,
    pub stock: u32,
    pub min_stock_threshold: u32,
    pub expiry_date: String,
    pub description: Option<String>,
    pub side_effects: Option<String>,
    pub is_locked: bool,
    pub is_low_stock: bool,
    /// Past its expiry date as of today (UTC)
    pub is_expired: bool,
    pub created_at: String,
    pub created_by: String,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<String>,
    pub history: Vec<FfiModificationLog>,
}

impl From<Drug> for FfiDrug {
    fn from(drug: Drug) -> Self {
        let is_low_stock = drug.is_low_stock();
        let is_expired = drug.is_expired(Utc::now().date_naive());
        Self {
            id: drug.id,
            code: drug.code,
            name: drug.name,
            category: drug.category,
            manufacturer: drug.manufacturer,
            price: drug.price.to_string(),
            stock: drug.stock,
            min_stock_threshold: drug.min_stock_threshold,
            expiry_date: db::format_date(&drug.expiry_date),
            description: drug.description,
            side_effects: drug.side_effects,
            is_locked: drug.is_locked,
            is_low_stock,
            is_expired,
            created_at: db::format_timestamp(&drug.created_at),
            created_by: drug.created_by,
            deleted_at: drug.deleted_at.as_ref().map(db::format_timestamp),
            deleted_by: drug.deleted_by,
            history: drug.history.into_iter().map(|h| h.into()).collect(),
        }
    }
}

/// FFI-safe history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiModificationLog {
    pub timestamp: String,
    pub changed_by: String,
    pub changes: Vec<FfiFieldChange>,
}

impl From<ModificationLog> for FfiModificationLog {
    fn from(log: ModificationLog) -> Self {
        Self {
            timestamp: db::format_timestamp(&log.timestamp),
            changed_by: log.changed_by,
            changes: log.changes.into_iter().map(|c| c.into()).collect(),
        }
    }
}

/// FFI-safe field delta, values rendered as display text.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

impl From<FieldChange> for FfiFieldChange {
    fn from(change: FieldChange) -> Self {
        Self {
            field: change.field.as_str().to_string(),
            old_value: change.old_value.to_string(),
            new_value: change.new_value.to_string(),
        }
    }
}

/// FFI-safe drug creation input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewDrug {
    pub code: String,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub price: String,
    pub stock: u32,
    pub min_stock_threshold: Option<u32>,
    pub expiry_date: String,
    pub description: Option<String>,
    pub side_effects: Option<String>,
    pub is_locked: bool,
}

impl TryFrom<FfiNewDrug> for NewDrug {
    type Error = MediTrackError;

    fn try_from(input: FfiNewDrug) -> Result<Self, Self::Error> {
        let mut drug = NewDrug::new(
            input.code,
            input.name,
            parse_money("price", &input.price)?,
            input.stock,
            parse_day("expiry_date", &input.expiry_date)?,
        );
        drug.category = input.category;
        drug.manufacturer = input.manufacturer;
        if let Some(threshold) = input.min_stock_threshold {
            drug.min_stock_threshold = threshold;
        }
        drug.description = input.description;
        drug.side_effects = input.side_effects;
        drug.is_locked = input.is_locked;
        Ok(drug)
    }
}

/// FFI-safe partial update. An empty description or side-effects string
/// clears the field.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiDrugPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<String>,
    pub stock: Option<u32>,
    pub min_stock_threshold: Option<u32>,
    pub expiry_date: Option<String>,
    pub description: Option<String>,
    pub side_effects: Option<String>,
}

impl TryFrom<FfiDrugPatch> for DrugPatch {
    type Error = MediTrackError;

    fn try_from(patch: FfiDrugPatch) -> Result<Self, Self::Error> {
        let clearable = |value: Option<String>| {
            value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
        };
        Ok(DrugPatch {
            name: patch.name,
            code: patch.code,
            category: patch.category,
            manufacturer: patch.manufacturer,
            price: patch
                .price
                .as_deref()
                .map(|p| parse_money("price", p))
                .transpose()?,
            stock: patch.stock,
            min_stock_threshold: patch.min_stock_threshold,
            expiry_date: patch
                .expiry_date
                .as_deref()
                .map(|d| parse_day("expiry_date", d))
                .transpose()?,
            description: clearable(patch.description),
            side_effects: clearable(patch.side_effects),
        })
    }
}

/// FFI-safe selection criterion for batch deletes.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiSelectionCriterion {
    Category { value: String },
    Manufacturer { value: String },
    CreatedBefore { date: String },
    CreatedAfter { date: String },
}

impl TryFrom<FfiSelectionCriterion> for SelectionCriterion {
    type Error = MediTrackError;

    fn try_from(criterion: FfiSelectionCriterion) -> Result<Self, Self::Error> {
        Ok(match criterion {
            FfiSelectionCriterion::Category { value } => SelectionCriterion::Category(value),
            FfiSelectionCriterion::Manufacturer { value } => SelectionCriterion::Manufacturer(value),
            FfiSelectionCriterion::CreatedBefore { date } => {
                SelectionCriterion::CreatedBefore(parse_day("date", &date)?)
            }
            FfiSelectionCriterion::CreatedAfter { date } => {
                SelectionCriterion::CreatedAfter(parse_day("date", &date)?)
            }
        })
    }
}

/// FFI-safe batch delete counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBatchDeleteOutcome {
    pub deleted: u32,
    pub skipped_locked: u32,
}

impl From<BatchDeleteOutcome> for FfiBatchDeleteOutcome {
    fn from(outcome: BatchDeleteOutcome) -> Self {
        Self {
            deleted: outcome.deleted as u32,
            skipped_locked: outcome.skipped_locked as u32,
        }
    }
}

/// FFI-safe cart line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCartLine {
    pub drug_id: String,
    pub quantity: u32,
}

impl From<FfiCartLine> for CartLine {
    fn from(line: FfiCartLine) -> Self {
        CartLine::new(line.drug_id, line.quantity)
    }
}

/// FFI-safe sale.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSale {
    pub id: String,
    pub timestamp: String,
    pub items: Vec<FfiSaleItem>,
    pub total_amount: String,
    pub cashier_name: String,
    pub customer_name: String,
}

impl From<SaleRecord> for FfiSale {
    fn from(sale: SaleRecord) -> Self {
        Self {
            id: sale.id,
            timestamp: db::format_timestamp(&sale.timestamp),
            items: sale.items.into_iter().map(|i| i.into()).collect(),
            total_amount: models::display_amount(sale.total_amount),
            cashier_name: sale.cashier_name,
            customer_name: sale.customer_name,
        }
    }
}

/// FFI-safe sale line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaleItem {
    pub drug_id: String,
    pub drug_name: String,
    pub quantity: u32,
    pub price_at_sale: String,
    pub total: String,
}

impl From<SaleItem> for FfiSaleItem {
    fn from(item: SaleItem) -> Self {
        Self {
            drug_id: item.drug_id,
            drug_name: item.drug_name,
            quantity: item.quantity,
            price_at_sale: models::display_amount(item.price_at_sale),
            total: models::display_amount(item.total),
        }
    }
}

/// FFI-safe import verdict.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportLine {
    pub line_number: u32,
    pub raw: String,
    pub is_valid: bool,
    /// Rejection reason for invalid lines
    pub reason: Option<String>,
}

impl From<ImportLine> for FfiImportLine {
    fn from(line: ImportLine) -> Self {
        let reason = match &line.verdict {
            LineVerdict::Valid(_) => None,
            LineVerdict::Invalid(issue) => Some(issue.as_str().to_string()),
        };
        Self {
            line_number: line.line_number as u32,
            is_valid: reason.is_none(),
            raw: line.raw,
            reason,
        }
    }
}

/// FFI-safe batch create failure.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBatchFailure {
    pub index: u32,
    pub code: String,
    pub reason: String,
}

/// FFI-safe import result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportResult {
    pub lines: Vec<FfiImportLine>,
    pub created: Vec<FfiDrug>,
    pub failures: Vec<FfiBatchFailure>,
}

impl From<ImportOutcome> for FfiImportResult {
    fn from(outcome: ImportOutcome) -> Self {
        Self {
            lines: outcome.lines.into_iter().map(|l| l.into()).collect(),
            created: outcome.report.created.into_iter().map(|d| d.into()).collect(),
            failures: outcome
                .report
                .failures
                .into_iter()
                .map(|f| FfiBatchFailure {
                    index: f.index as u32,
                    code: f.code,
                    reason: f.reason,
                })
                .collect(),
        }
    }
}
