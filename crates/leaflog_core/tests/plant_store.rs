use leaflog_core::db::open_db_in_memory;
use leaflog_core::{
    InMemoryPlantStore, Plant, PlantInput, PlantStore, SqlitePlantStore, StoreError,
};
use uuid::Uuid;

fn plant(name: &str, frequency: i64) -> Plant {
    Plant::from_input(&PlantInput {
        name: name.to_string(),
        species: "Araceae".to_string(),
        watering_frequency_days: frequency,
        notes: Some(format!("{name} notes")),
        last_watered: Some(1_700_000_000_000),
    })
    .unwrap()
}

fn exercise_crud(store: &dyn PlantStore) {
    let first = plant("Anthurium", 5);
    let second = plant("Philodendron", 9);

    assert!(store.find_all().unwrap().is_empty());
    assert_eq!(store.save(&first).unwrap(), first);
    store.save(&second).unwrap();

    let loaded = store.find_by_id(first.id()).unwrap().unwrap();
    assert_eq!(loaded, first);

    let all = store.find_all().unwrap();
    let ids: Vec<_> = all.iter().map(Plant::id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);

    let mut renamed = first.clone();
    renamed.update_watering_frequency(12).unwrap();
    store.save(&renamed).unwrap();
    assert_eq!(
        store
            .find_by_id(first.id())
            .unwrap()
            .unwrap()
            .watering_frequency()
            .days(),
        12
    );
    assert_eq!(store.find_all().unwrap().len(), 2);

    store.delete_by_id(first.id()).unwrap();
    assert!(store.find_by_id(first.id()).unwrap().is_none());
    store.delete_by_id(first.id()).unwrap();
    assert_eq!(store.find_all().unwrap().len(), 1);

    assert!(store.find_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn in_memory_store_crud() {
    let store = InMemoryPlantStore::new();
    exercise_crud(&store);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn sqlite_store_crud_over_borrowed_connection() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlantStore::new(&conn);
    exercise_crud(&store);
}

#[test]
fn sqlite_store_crud_over_owned_connection() {
    let store = SqlitePlantStore::new(open_db_in_memory().unwrap());
    exercise_crud(&store);
}

#[test]
fn in_memory_stores_do_not_share_state() {
    let a = InMemoryPlantStore::new();
    let b = InMemoryPlantStore::new();
    a.save(&plant("Hoya", 10)).unwrap();
    assert_eq!(a.len().unwrap(), 1);
    assert!(b.is_empty().unwrap());
}

#[test]
fn sqlite_store_preserves_never_watered_and_empty_notes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlantStore::new(&conn);

    let bare = Plant::from_input(&PlantInput {
        name: "Cactus".to_string(),
        species: "Cactaceae".to_string(),
        watering_frequency_days: 30,
        notes: None,
        last_watered: None,
    })
    .unwrap();
    store.save(&bare).unwrap();

    let loaded = store.find_by_id(bare.id()).unwrap().unwrap();
    assert_eq!(loaded.last_watered().epoch_ms(), None);
    assert!(loaded.notes().is_empty());
}

#[test]
fn sqlite_store_reads_future_timestamps_written_under_clock_skew() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlantStore::new(&conn);
    let stored = plant("Fern", 2);
    store.save(&stored).unwrap();

    conn.execute(
        "UPDATE plants SET last_watered_ms = ?1 WHERE id = ?2;",
        rusqlite::params![i64::MAX / 2, stored.id().to_string()],
    )
    .unwrap();

    let loaded = store.find_by_id(stored.id()).unwrap().unwrap();
    assert_eq!(loaded.last_watered().epoch_ms(), Some(i64::MAX / 2));
}

#[test]
fn sqlite_store_rejects_corrupt_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlantStore::new(&conn);
    let stored = plant("Peperomia", 6);
    store.save(&stored).unwrap();

    conn.execute(
        "UPDATE plants SET name = '' WHERE id = ?1;",
        [stored.id().to_string()],
    )
    .unwrap();

    let err = store.find_by_id(stored.id()).unwrap_err();
    match err {
        StoreError::InvalidData(message) => {
            assert!(message.contains("plants.name"), "unexpected message: {message}")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_store_rejects_invalid_ids() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO plants (id, name, species, watering_frequency_days)
         VALUES ('not-a-uuid', 'Ivy', 'Hedera', 3);",
        [],
    )
    .unwrap();

    let store = SqlitePlantStore::new(&conn);
    let err = store.find_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
