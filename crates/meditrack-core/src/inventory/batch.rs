//! Batch operations over the catalog.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Inventory, InventoryError, InventoryResult};
use crate::db::{current_timestamp, DbError};
use crate::models::{Actor, Drug, NewDrug, SelectionCriterion};

/// Outcome of a batch create. Failed items never abort the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateReport {
    pub created: Vec<Drug>,
    pub failures: Vec<BatchFailure>,
}

/// One rejected item of a batch create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the item in the submitted list
    pub index: usize,
    pub code: String,
    pub reason: String,
}

/// Counts from a batch delete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteOutcome {
    pub deleted: usize,
    pub skipped_locked: usize,
}

impl<'a> Inventory<'a> {
    /// Create each item independently, collecting per-item failures.
    pub fn batch_create(&self, inputs: Vec<NewDrug>, actor: &Actor) -> BatchCreateReport {
        let mut report = BatchCreateReport::default();

        for (index, input) in inputs.into_iter().enumerate() {
            let code = input.code.clone();
            match self.create(input, actor) {
                Ok(drug) => report.created.push(drug),
                Err(e) => {
                    warn!(index, code = %code, error = %e, "batch item rejected");
                    report.failures.push(BatchFailure {
                        index,
                        code,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.failures.len(),
            actor = %actor.name,
            "batch create finished"
        );
        report
    }

    /// Soft-delete the unlocked drugs among `ids`; locked ones are skipped.
    ///
    /// Ids that are not in the active partition are ignored. Nothing is
    /// mutated when no id resolves or every resolved drug is locked.
    pub fn batch_delete(&self, ids: &[String], actor: &Actor) -> InventoryResult<BatchDeleteOutcome> {
        let tx = self.db.begin_immediate()?;
        let targets = self.db.get_active_drugs_by_ids(ids)?;
        if targets.is_empty() {
            return Err(InventoryError::NoMatch);
        }

        let (locked, unlocked): (Vec<&Drug>, Vec<&Drug>) =
            targets.iter().partition(|drug| drug.is_locked);
        if unlocked.is_empty() {
            warn!(targets = targets.len(), actor = %actor.name, "batch delete blocked, all locked");
            return Err(InventoryError::AllLocked);
        }

        let now = current_timestamp();
        let mut deleted = 0;
        for drug in &unlocked {
            if self.db.mark_drug_deleted(&drug.id, &now, &actor.name)? {
                deleted += 1;
            }
        }
        tx.commit().map_err(DbError::from)?;

        let outcome = BatchDeleteOutcome {
            deleted,
            skipped_locked: locked.len(),
        };
        info!(
            deleted = outcome.deleted,
            skipped_locked = outcome.skipped_locked,
            actor = %actor.name,
            "batch delete finished"
        );
        Ok(outcome)
    }

    /// Active drugs matching a selection criterion. Read-only.
    pub fn select_by_criterion(&self, criterion: &SelectionCriterion) -> InventoryResult<Vec<Drug>> {
        Ok(self.db.select_active_drugs(criterion)?)
    }

    /// Batch-delete every active drug matching `criterion`.
    pub fn batch_delete_matching(
        &self,
        criterion: &SelectionCriterion,
        actor: &Actor,
    ) -> InventoryResult<BatchDeleteOutcome> {
        let ids: Vec<String> = self
            .select_by_criterion(criterion)?
            .into_iter()
            .map(|drug| drug.id)
            .collect();
        self.batch_delete(&ids, actor)
    }
}
