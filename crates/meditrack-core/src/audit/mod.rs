//! Change-diff engine.
//!
//! Compares a drug snapshot against proposed edits and produces the field
//! deltas that go into its modification history. Only the ten tracked fields
//! are ever compared; lock state and timestamps never reach history.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{Actor, Drug, DrugPatch, FieldChange, ModificationLog, TrackedField};

/// Diff `previous` against the fields present in `proposed`.
///
/// Changes come back in [`TrackedField::ALL`] order. Absent patch fields are
/// skipped, so they can never produce a change.
pub fn diff(previous: &Drug, proposed: &DrugPatch) -> Vec<FieldChange> {
    let mut next = previous.clone();
    proposed.apply_to(&mut next);

    let changes: Vec<FieldChange> = TrackedField::ALL
        .iter()
        .filter(|field| is_proposed(proposed, **field))
        .filter_map(|field| {
            let old_value = field.value_of(previous);
            let new_value = field.value_of(&next);
            (old_value != new_value).then(|| FieldChange {
                field: *field,
                old_value,
                new_value,
            })
        })
        .collect();

    debug!(
        drug_id = %previous.id,
        changed = changes.len(),
        fields = ?changes.iter().map(|c| c.field.as_str()).collect::<Vec<_>>(),
        "computed drug diff"
    );
    changes
}

/// Wrap a non-empty diff into a history entry attributed to `actor`.
pub fn build_log(
    changes: Vec<FieldChange>,
    actor: &Actor,
    at: DateTime<Utc>,
) -> Option<ModificationLog> {
    if changes.is_empty() {
        return None;
    }
    Some(ModificationLog {
        timestamp: at,
        changed_by: actor.name.clone(),
        changes,
    })
}

fn is_proposed(patch: &DrugPatch, field: TrackedField) -> bool {
    match field {
        TrackedField::Name => patch.name.is_some(),
        TrackedField::Code => patch.code.is_some(),
        TrackedField::Category => patch.category.is_some(),
        TrackedField::Manufacturer => patch.manufacturer.is_some(),
        TrackedField::Price => patch.price.is_some(),
        TrackedField::Stock => patch.stock.is_some(),
        TrackedField::MinStockThreshold => patch.min_stock_threshold.is_some(),
        TrackedField::ExpiryDate => patch.expiry_date.is_some(),
        TrackedField::Description => patch.description.is_some(),
        TrackedField::SideEffects => patch.side_effects.is_some(),
    }
}
