//! Drug lifecycle integration tests.

use chrono::NaiveDate;
use meditrack_core::db::Database;
use meditrack_core::inventory::{Inventory, InventoryError};
use meditrack_core::models::{Actor, DrugPatch, FieldValue, NewDrug, Partition, Role, TrackedField};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn admin() -> Actor {
    Actor::new("u-admin", "Admin", Role::Admin)
}

fn pharmacist() -> Actor {
    Actor::new("u-li", "Li", Role::Pharmacist)
}

fn amoxicillin() -> NewDrug {
    let mut input = NewDrug::new(
        "D001",
        "Amoxicillin",
        Decimal::new(1250, 2),
        40,
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
    );
    input.category = "Antibiotic".into();
    input.manufacturer = "Acme".into();
    input.description = Some("Capsules".into());
    input
}

#[test]
fn test_soft_delete_then_restore_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let inventory = Inventory::new(&db);

    let created = inventory.create(amoxicillin(), &admin()).unwrap();
    let edited = inventory
        .update(
            &created.id,
            &DrugPatch {
                stock: Some(35),
                ..Default::default()
            },
            &pharmacist(),
        )
        .unwrap();

    let deleted = inventory.soft_delete(&edited.id, &pharmacist()).unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.deleted_by.as_deref(), Some("Li"));
    assert!(inventory.get(&edited.id).is_err());

    let restored = inventory.restore(&edited.id).unwrap();
    assert_eq!(restored, edited);
    assert_eq!(inventory.get(&edited.id).unwrap(), edited);
    assert_eq!(restored.history.len(), 1);
}

#[test]
fn test_purge_is_terminal() {
    let db = Database::open_in_memory().unwrap();
    let inventory = Inventory::new(&db);
    let drug = inventory.create(amoxicillin(), &admin()).unwrap();

    inventory.soft_delete(&drug.id, &admin()).unwrap();
    inventory.purge_deleted(&drug.id, &admin()).unwrap();

    assert!(matches!(inventory.restore(&drug.id), Err(InventoryError::NotFound(_))));
    assert!(matches!(
        inventory.purge_deleted(&drug.id, &admin()),
        Err(InventoryError::NotFound(_))
    ));
    // The code is free again
    assert!(inventory.create(amoxicillin(), &admin()).is_ok());
}

#[test]
fn test_history_newest_first_across_edits() {
    let db = Database::open_in_memory().unwrap();
    let inventory = Inventory::new(&db);
    let drug = inventory.create(amoxicillin(), &admin()).unwrap();

    inventory
        .update(
            &drug.id,
            &DrugPatch {
                price: Some(Decimal::new(1300, 2)),
                ..Default::default()
            },
            &admin(),
        )
        .unwrap();
    let latest = inventory
        .update(
            &drug.id,
            &DrugPatch {
                description: Some(None),
                manufacturer: Some("Bayer".into()),
                ..Default::default()
            },
            &pharmacist(),
        )
        .unwrap();

    assert_eq!(latest.history.len(), 2);
    assert_eq!(latest.history[0].changed_by, "Li");
    assert_eq!(latest.history[0].changes[0].field, TrackedField::Manufacturer);
    assert_eq!(latest.history[0].changes[1].field, TrackedField::Description);
    assert_eq!(latest.history[0].changes[1].new_value, FieldValue::Empty);
    assert_eq!(latest.history[1].changes[0].field, TrackedField::Price);
    assert_eq!(
        latest.history[1].changes[0].new_value,
        FieldValue::Decimal(Decimal::new(1300, 2))
    );
}

#[test]
fn test_deleted_code_can_be_reused() {
    let db = Database::open_in_memory().unwrap();
    let inventory = Inventory::new(&db);
    let first = inventory.create(amoxicillin(), &admin()).unwrap();
    inventory.soft_delete(&first.id, &admin()).unwrap();

    let second = inventory.create(amoxicillin(), &admin()).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(inventory.list(Partition::Active).unwrap().len(), 1);
    assert_eq!(inventory.list(Partition::Deleted).unwrap().len(), 1);
}

#[test]
fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meditrack.db");

    let id = {
        let db = Database::open(&path).unwrap();
        Inventory::new(&db).create(amoxicillin(), &admin()).unwrap().id
    };

    let db = Database::open(&path).unwrap();
    let drug = Inventory::new(&db).get(&id).unwrap();
    assert_eq!(drug.code, "D001");
    assert_eq!(drug.price, Decimal::new(1250, 2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_noop_update_keeps_history_length(edits in 0usize..4) {
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(amoxicillin(), &admin()).unwrap();
        for i in 0..edits {
            inventory
                .update(&drug.id, &DrugPatch { stock: Some(1000 + i as u32), ..Default::default() }, &admin())
                .unwrap();
        }
        let before = inventory.get(&drug.id).unwrap();

        let patch = DrugPatch::from_drug(&before);
        let after = inventory.update(&drug.id, &patch, &pharmacist()).unwrap();

        prop_assert_eq!(after.history.len(), before.history.len());
        prop_assert_eq!(after.history.len(), edits);
    }

    #[test]
    fn prop_single_field_edit_adds_one_entry(stock in 0u32..1000) {
        prop_assume!(stock != 40);
        let db = Database::open_in_memory().unwrap();
        let inventory = Inventory::new(&db);
        let drug = inventory.create(amoxicillin(), &admin()).unwrap();

        let mut patch = DrugPatch::from_drug(&drug);
        patch.stock = Some(stock);
        let after = inventory.update(&drug.id, &patch, &pharmacist()).unwrap();

        prop_assert_eq!(after.history.len(), 1);
        let changes = &after.history[0].changes;
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(changes[0].field, TrackedField::Stock);
        prop_assert_eq!(&changes[0].old_value, &FieldValue::Integer(40));
        prop_assert_eq!(&changes[0].new_value, &FieldValue::Integer(i64::from(stock)));
    }
}
