//! Drug lifecycle management.
//!
//! Every drug moves through three states:
//!
//! ```text
//!   Create ──▶ Active ──SoftDelete (unlocked)──▶ Deleted ──Purge (admin)──▶ Purged
//!                ▲  │                               │
//!                │  └──ToggleLock (admin)           │
//!                └──────────────Restore─────────────┘
//! ```
//!
//! Read-check-write sequences run inside an immediate transaction so lock
//! toggles, history appends and code checks are serialized.

mod batch;

pub use batch::*;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::audit;
use crate::db::{current_timestamp, Database, DbError};
use crate::models::{Actor, Drug, DrugPatch, NewDrug, Partition};

/// Lifecycle and batch errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Drug not found: {0}")]
    NotFound(String),

    #[error("Drug code already in use: {0}")]
    DuplicateCode(String),

    #[error("Drug is locked: {0}")]
    Locked(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No drugs match the selection")]
    NoMatch,

    #[error("All selected drugs are locked")]
    AllLocked,
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Drug lifecycle manager.
pub struct Inventory<'a> {
    db: &'a Database,
}

impl<'a> Inventory<'a> {
    /// Create a new lifecycle manager.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a drug to the active partition.
    pub fn create(&self, input: NewDrug, actor: &Actor) -> InventoryResult<Drug> {
        let input = validate_new(input)?;

        let tx = self.db.begin_immediate()?;
        if self.db.active_code_exists(&input.code, None)? {
            warn!(code = %input.code, actor = %actor.name, "rejected duplicate drug code");
            return Err(InventoryError::DuplicateCode(input.code));
        }

        let drug = Drug {
            id: uuid::Uuid::new_v4().to_string(),
            code: input.code,
            name: input.name,
            category: input.category,
            manufacturer: input.manufacturer,
            price: input.price,
            stock: input.stock,
            min_stock_threshold: input.min_stock_threshold,
            expiry_date: input.expiry_date,
            description: input.description,
            side_effects: input.side_effects,
            is_locked: input.is_locked,
            created_at: current_timestamp(),
            created_by: actor.name.clone(),
            deleted_at: None,
            deleted_by: None,
            history: Vec::new(),
        };
        self.db.insert_drug(&drug)?;
        tx.commit().map_err(DbError::from)?;

        info!(drug_id = %drug.id, code = %drug.code, actor = %actor.name, "created drug");
        Ok(drug)
    }

    /// Apply proposed edits to an active drug, recording any changes in history.
    ///
    /// An edit that changes nothing leaves the history untouched.
    pub fn update(&self, id: &str, patch: &DrugPatch, actor: &Actor) -> InventoryResult<Drug> {
        let patch = validate_patch(patch)?;

        let tx = self.db.begin_immediate()?;
        let mut drug = self.require(id, Partition::Active)?;

        if let Some(code) = &patch.code {
            if *code != drug.code && self.db.active_code_exists(code, Some(id))? {
                warn!(drug_id = %id, code = %code, "rejected duplicate drug code");
                return Err(InventoryError::DuplicateCode(code.clone()));
            }
        }

        let changes = audit::diff(&drug, &patch);
        let Some(log) = audit::build_log(changes, actor, current_timestamp()) else {
            return Ok(drug);
        };

        patch.apply_to(&mut drug);
        self.db.update_drug_fields(&drug)?;
        self.db.append_history(&drug.id, &log)?;
        tx.commit().map_err(DbError::from)?;

        info!(
            drug_id = %drug.id,
            changes = log.changes.len(),
            actor = %actor.name,
            "updated drug"
        );
        drug.history.insert(0, log);
        Ok(drug)
    }

    /// Flip the lock flag on an active drug. Admin only.
    ///
    /// Returns the new lock state.
    pub fn toggle_lock(&self, id: &str, actor: &Actor) -> InventoryResult<bool> {
        self.require_admin(actor, "toggle drug lock")?;

        let tx = self.db.begin_immediate()?;
        let drug = self.require(id, Partition::Active)?;
        let locked = !drug.is_locked;
        self.db.set_drug_locked(id, locked)?;
        tx.commit().map_err(DbError::from)?;

        info!(drug_id = %id, locked, actor = %actor.name, "toggled drug lock");
        Ok(locked)
    }

    /// Move an unlocked active drug to the deleted partition.
    pub fn soft_delete(&self, id: &str, actor: &Actor) -> InventoryResult<Drug> {
        let tx = self.db.begin_immediate()?;
        let mut drug = self.require(id, Partition::Active)?;
        if drug.is_locked {
            warn!(drug_id = %id, actor = %actor.name, "rejected delete of locked drug");
            return Err(InventoryError::Locked(drug.code));
        }

        let now = current_timestamp();
        self.db.mark_drug_deleted(id, &now, &actor.name)?;
        tx.commit().map_err(DbError::from)?;

        drug.deleted_at = Some(now);
        drug.deleted_by = Some(actor.name.clone());
        info!(drug_id = %id, actor = %actor.name, "soft-deleted drug");
        Ok(drug)
    }

    /// Move a drug from the deleted partition back to active.
    pub fn restore(&self, id: &str) -> InventoryResult<Drug> {
        let tx = self.db.begin_immediate()?;
        let mut drug = self.require(id, Partition::Deleted)?;
        if self.db.active_code_exists(&drug.code, Some(id))? {
            warn!(drug_id = %id, code = %drug.code, "rejected restore over an active code");
            return Err(InventoryError::DuplicateCode(drug.code));
        }

        self.db.mark_drug_restored(id)?;
        tx.commit().map_err(DbError::from)?;

        drug.deleted_at = None;
        drug.deleted_by = None;
        info!(drug_id = %id, "restored drug");
        Ok(drug)
    }

    /// Permanently remove a drug from the deleted partition. Admin only.
    pub fn purge_deleted(&self, id: &str, actor: &Actor) -> InventoryResult<()> {
        self.require_admin(actor, "purge drug")?;

        if !self.db.purge_drug(id)? {
            return Err(InventoryError::NotFound(id.to_string()));
        }
        info!(drug_id = %id, actor = %actor.name, "purged drug");
        Ok(())
    }

    /// Get an active drug.
    pub fn get(&self, id: &str) -> InventoryResult<Drug> {
        self.require(id, Partition::Active)
    }

    /// Get a drug from the deleted partition.
    pub fn get_deleted(&self, id: &str) -> InventoryResult<Drug> {
        self.require(id, Partition::Deleted)
    }

    /// List a partition, newest first.
    pub fn list(&self, partition: Partition) -> InventoryResult<Vec<Drug>> {
        Ok(self.db.list_drugs(partition)?)
    }

    /// Active drugs below their reorder threshold.
    pub fn low_stock(&self) -> InventoryResult<Vec<Drug>> {
        Ok(self.db.list_low_stock_drugs()?)
    }

    fn require(&self, id: &str, partition: Partition) -> InventoryResult<Drug> {
        self.db
            .get_drug(id, partition)?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    fn require_admin(&self, actor: &Actor, action: &str) -> InventoryResult<()> {
        if actor.is_admin() {
            return Ok(());
        }
        warn!(actor = %actor.name, role = %actor.role, action, "rejected non-admin action");
        Err(InventoryError::Forbidden(format!(
            "{} requires the admin role",
            action
        )))
    }
}

fn validate_new(mut input: NewDrug) -> InventoryResult<NewDrug> {
    input.code = required_text("code", &input.code)?;
    input.name = required_text("name", &input.name)?;
    if input.price < Decimal::ZERO {
        return Err(InventoryError::InvalidInput("price must not be negative".into()));
    }
    Ok(input)
}

fn validate_patch(patch: &DrugPatch) -> InventoryResult<DrugPatch> {
    let mut patch = patch.clone();
    if let Some(code) = &patch.code {
        patch.code = Some(required_text("code", code)?);
    }
    if let Some(name) = &patch.name {
        patch.name = Some(required_text("name", name)?);
    }
    if let Some(price) = patch.price {
        if price < Decimal::ZERO {
            return Err(InventoryError::InvalidInput("price must not be negative".into()));
        }
    }
    Ok(patch)
}

fn required_text(field: &str, value: &str) -> InventoryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, Role, TrackedField};
    use chrono::NaiveDate;

    fn admin() -> Actor {
        Actor::new("u-admin", "Admin", Role::Admin)
    }

    fn pharmacist() -> Actor {
        Actor::new("u-li", "Li", Role::Pharmacist)
    }

    fn new_drug(code: &str) -> NewDrug {
        NewDrug::new(
            code,
            format!("Drug {}", code),
            Decimal::new(1000, 2),
            5,
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        )
    }

    #[test]
    fn test_create_sets_audit_fields() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);

        let drug = inventory.create(new_drug("D100"), &pharmacist()).unwrap();
        assert_eq!(drug.created_by, "Li");
        assert!(drug.history.is_empty());
        assert_eq!(inventory.get(&drug.id).unwrap(), drug);
    }

    #[test]
    fn test_create_rejects_duplicate_and_invalid() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        inventory.create(new_drug("D100"), &admin()).unwrap();

        assert!(matches!(
            inventory.create(new_drug("D100"), &admin()),
            Err(InventoryError::DuplicateCode(_))
        ));
        assert!(matches!(
            inventory.create(new_drug("   "), &admin()),
            Err(InventoryError::InvalidInput(_))
        ));

        let mut negative = new_drug("D101");
        negative.price = Decimal::new(-1, 0);
        assert!(matches!(
            inventory.create(negative, &admin()),
            Err(InventoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_update_records_history() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(new_drug("D100"), &admin()).unwrap();

        let patch = DrugPatch {
            stock: Some(50),
            ..Default::default()
        };
        let updated = inventory.update(&drug.id, &patch, &pharmacist()).unwrap();
        assert_eq!(updated.stock, 50);
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.history[0].changed_by, "Li");
        assert_eq!(updated.history[0].changes[0].field, TrackedField::Stock);
        assert_eq!(updated.history[0].changes[0].old_value, FieldValue::Integer(5));

        // Re-saving the same values adds nothing
        let again = inventory
            .update(&drug.id, &DrugPatch::from_drug(&updated), &pharmacist())
            .unwrap();
        assert_eq!(again.history.len(), 1);
        assert_eq!(inventory.get(&drug.id).unwrap(), again);
    }

    #[test]
    fn test_update_rejects_code_collision() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        inventory.create(new_drug("D100"), &admin()).unwrap();
        let other = inventory.create(new_drug("D200"), &admin()).unwrap();

        let patch = DrugPatch {
            code: Some("D100".into()),
            ..Default::default()
        };
        assert!(matches!(
            inventory.update(&other.id, &patch, &admin()),
            Err(InventoryError::DuplicateCode(_))
        ));
        assert!(matches!(
            inventory.update("missing", &DrugPatch::default(), &admin()),
            Err(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_toggle_lock_admin_only() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(new_drug("D100"), &admin()).unwrap();

        assert!(matches!(
            inventory.toggle_lock(&drug.id, &pharmacist()),
            Err(InventoryError::Forbidden(_))
        ));
        assert!(inventory.toggle_lock(&drug.id, &admin()).unwrap());
        assert!(!inventory.toggle_lock(&drug.id, &admin()).unwrap());
        // Lock state is not a tracked field
        assert!(inventory.get(&drug.id).unwrap().history.is_empty());
    }

    #[test]
    fn test_locked_drug_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(new_drug("D100"), &admin()).unwrap();
        inventory.toggle_lock(&drug.id, &admin()).unwrap();

        assert!(matches!(
            inventory.soft_delete(&drug.id, &admin()),
            Err(InventoryError::Locked(_))
        ));
        assert_eq!(inventory.list(Partition::Active).unwrap().len(), 1);
    }

    #[test]
    fn test_restore_blocked_by_reused_code() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(new_drug("D100"), &admin()).unwrap();
        inventory.soft_delete(&drug.id, &admin()).unwrap();
        inventory.create(new_drug("D100"), &admin()).unwrap();

        assert!(matches!(
            inventory.restore(&drug.id),
            Err(InventoryError::DuplicateCode(_))
        ));
        assert!(inventory.get_deleted(&drug.id).is_ok());
    }

    #[test]
    fn test_purge_admin_only() {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(new_drug("D100"), &admin()).unwrap();

        // Active drugs cannot be purged
        assert!(matches!(
            inventory.purge_deleted(&drug.id, &admin()),
            Err(InventoryError::NotFound(_))
        ));

        inventory.soft_delete(&drug.id, &pharmacist()).unwrap();
        assert!(matches!(
            inventory.purge_deleted(&drug.id, &pharmacist()),
            Err(InventoryError::Forbidden(_))
        ));
        inventory.purge_deleted(&drug.id, &admin()).unwrap();
        assert!(inventory.list(Partition::Deleted).unwrap().is_empty());
    }
}
