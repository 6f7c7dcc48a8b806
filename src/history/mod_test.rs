#![allow(clippy::float_cmp)]

use super::*;
use crate::model::ModelId;

fn entry(country: &str, ts: i64) -> HistoryEntry {
    HistoryEntry {
        country: country.to_owned(),
        year: 2030,
        models: vec![ModelId::Lasso],
        predicted: 100.0,
        change: 1.5,
        ts,
    }
}

fn countries(snapshot: &HistorySnapshot) -> Vec<&str> {
    snapshot.iter().map(|e| e.country.as_str()).collect()
}

// =============================================================
// open
// =============================================================

#[test]
fn open_empty_slot_yields_empty_snapshot() {
    let store = PersistentHistoryStore::open(MemorySlot::new());
    assert!(store.load().is_empty());
    assert_eq!(store.durability(), &Durability::Durable);
}

#[test]
fn open_corrupt_slot_yields_empty_snapshot() {
    let store = PersistentHistoryStore::open(MemorySlot::with_contents("{not json"));
    assert!(store.load().is_empty());
}

#[test]
fn open_wrong_shape_yields_empty_snapshot() {
    let store = PersistentHistoryStore::open(MemorySlot::with_contents(r#"{"country":"India"}"#));
    assert!(store.load().is_empty());
}

#[test]
fn open_reads_persisted_entries() {
    let raw = r#"[{"country":"India","year":2030,"models":["lasso","ridge"],"predicted":950.0,"change":5.56,"ts":2},
                  {"country":"Brazil","year":2028,"models":["knn"],"predicted":12.5,"change":-1.0,"ts":1}]"#;
    let store = PersistentHistoryStore::open(MemorySlot::with_contents(raw));
    let snapshot = store.load();
    assert_eq!(countries(&snapshot), vec!["India", "Brazil"]);
    assert_eq!(snapshot.entries()[0].models, vec![ModelId::Lasso, ModelId::Ridge]);
}

fn slot_with(entries: &[HistoryEntry]) -> MemorySlot {
    MemorySlot::with_contents(serde_json::to_string(entries).unwrap())
}

fn keys(snapshot: &HistorySnapshot) -> Vec<i64> {
    snapshot.iter().map(|e| e.ts).collect()
}

#[test]
fn open_makes_repeated_keys_unique() {
    let store = PersistentHistoryStore::open(slot_with(&[entry("India", 5), entry("Brazil", 5), entry("Chile", 5)]));
    let snapshot = store.load();
    assert_eq!(countries(&snapshot), vec!["India", "Brazil", "Chile"]);
    assert_eq!(keys(&snapshot), vec![5, 4, 3]);
}

#[test]
fn delete_after_open_removes_only_the_keyed_entry() {
    let mut store = PersistentHistoryStore::open(slot_with(&[entry("India", 5), entry("Brazil", 5)]));
    let brazil = store.load().entries()[1].key();
    let removed = store.delete(brazil).unwrap();
    assert_eq!(removed.country, "Brazil");
    assert_eq!(countries(&store.load()), vec!["India"]);
}

#[test]
fn open_clamps_out_of_range_keys() {
    let store = PersistentHistoryStore::open(slot_with(&[entry("India", i64::MAX), entry("Brazil", i64::MIN)]));
    assert_eq!(keys(&store.load()), vec![MAX_TS_MS, -MAX_TS_MS]);
}

#[test]
fn open_leaves_well_formed_keys_alone() {
    let store = PersistentHistoryStore::open(slot_with(&[entry("India", 30), entry("Brazil", 20), entry("Chile", 10)]));
    assert_eq!(keys(&store.load()), vec![30, 20, 10]);
}

// =============================================================
// add / clear / delete
// =============================================================

#[test]
fn add_inserts_at_head_in_reverse_chronological_order() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    store.add(entry("B", 2));
    store.add(entry("C", 3));
    assert_eq!(countries(&store.load()), vec!["C", "B", "A"]);
}

#[test]
fn add_keeps_duplicates() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("India", 1));
    store.add(entry("India", 2));
    assert_eq!(store.load().len(), 2);
}

#[test]
fn add_persists_before_returning() {
    let slot = MemorySlot::new();
    let mut store = PersistentHistoryStore::open(slot.clone());
    store.add(entry("India", 7));
    assert_eq!(slot.writes(), 1);

    let reopened = PersistentHistoryStore::open(slot);
    assert_eq!(reopened.load(), store.load());
}

#[test]
fn count_tracks_adds_minus_clears() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    store.add(entry("B", 2));
    store.clear();
    store.add(entry("C", 3));
    assert_eq!(countries(&store.load()), vec!["C"]);
}

#[test]
fn clear_then_load_is_empty_and_persisted() {
    let slot = MemorySlot::new();
    let mut store = PersistentHistoryStore::open(slot.clone());
    store.add(entry("A", 1));
    store.clear();
    assert!(store.load().is_empty());
    assert_eq!(slot.contents().as_deref(), Some("[]"));
}

#[test]
fn earlier_snapshot_is_unchanged_by_later_mutation() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    let before = store.load();
    store.add(entry("B", 2));
    store.clear();
    assert_eq!(countries(&before), vec!["A"]);
}

#[test]
fn delete_removes_by_key() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    store.add(entry("B", 2));
    store.add(entry("C", 3));
    let removed = store.delete(EntryKey(2)).unwrap();
    assert_eq!(removed.country, "B");
    assert_eq!(countries(&store.load()), vec!["C", "A"]);
}

#[test]
fn delete_unknown_key_is_noop() {
    let slot = MemorySlot::new();
    let mut store = PersistentHistoryStore::open(slot.clone());
    store.add(entry("A", 1));
    assert!(store.delete(EntryKey(99)).is_none());
    assert_eq!(store.load().len(), 1);
    assert_eq!(slot.writes(), 1);
}

// =============================================================
// stamp
// =============================================================

#[test]
fn stamp_uses_clock_when_ahead() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 100));
    assert_eq!(store.stamp(500), 500);
}

#[test]
fn stamp_bumps_past_latest_key() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 100));
    assert_eq!(store.stamp(100), 101);
    assert_eq!(store.stamp(50), 101);
}

#[test]
fn stamp_never_overflows_after_extreme_stored_key() {
    let store = PersistentHistoryStore::open(slot_with(&[entry("India", i64::MAX)]));
    let ts = store.stamp(1_700_000_000_000);
    assert_eq!(ts, MAX_TS_MS + 1);
}

#[test]
fn stamp_clamps_runaway_clock() {
    let store = PersistentHistoryStore::open(MemorySlot::new());
    assert_eq!(store.stamp(i64::MAX), MAX_TS_MS);
}

// =============================================================
// export
// =============================================================

#[test]
fn export_parses_back_to_live_snapshot() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    store.add(entry("B", 2));
    let bytes = store.export_snapshot().unwrap();
    let parsed: HistorySnapshot = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, store.load());
}

#[test]
fn export_is_pretty_printed() {
    let mut store = PersistentHistoryStore::open(MemorySlot::new());
    store.add(entry("A", 1));
    let text = String::from_utf8(store.export_snapshot().unwrap()).unwrap();
    assert!(text.starts_with("[\n"));
    assert!(text.contains("  {"));
}

#[test]
fn export_of_empty_store_is_empty_array() {
    let store = PersistentHistoryStore::open(MemorySlot::new());
    assert_eq!(store.export_snapshot().unwrap(), b"[]");
}

// =============================================================
// persistence failures
// =============================================================

#[test]
fn failed_write_keeps_session_copy_and_degrades() {
    let slot = MemorySlot::new();
    let mut store = PersistentHistoryStore::open(slot.clone());
    slot.reject_writes(Some("quota exceeded"));

    store.add(entry("A", 1));
    assert_eq!(countries(&store.load()), vec!["A"]);
    assert!(matches!(store.durability(), Durability::Degraded(reason) if reason.contains("quota exceeded")));
    assert!(slot.contents().is_none());
}

#[test]
fn successful_write_restores_durability() {
    let slot = MemorySlot::new();
    let mut store = PersistentHistoryStore::open(slot.clone());
    slot.reject_writes(Some("disabled"));
    store.add(entry("A", 1));

    slot.reject_writes(None);
    store.add(entry("B", 2));
    assert_eq!(store.durability(), &Durability::Durable);

    let reopened = PersistentHistoryStore::open(slot);
    assert_eq!(countries(&reopened.load()), vec!["B", "A"]);
}
