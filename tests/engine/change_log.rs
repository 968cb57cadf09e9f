//! Change log reads against a live appender

use crate::common::*;
use tabula::{ChangeStore, PayloadKind, SparseChangeSet};

fn numbers(records: &[tabula::ChangeRecord]) -> Vec<u64> {
    records.iter().map(|r| r.change_number().as_u64()).collect()
}

#[test]
fn range_returns_every_change_in_order() {
    let t = TestEngine::new();
    let table = TableId::new(42);
    for i in 0..12 {
        t.append(&table, search(i % 3 == 0));
    }
    let records = t
        .engine
        .reader()
        .range(&table, ChangeNumber::new(5), ChangeNumber::new(10))
        .unwrap();
    assert_eq!(numbers(&records), vec![6, 7, 8, 9, 10]);
}

#[test]
fn range_with_missing_change_is_io_failure() {
    let t = TestEngine::new();
    let table = TableId::new(42);
    for _ in 0..12 {
        t.append(&table, search(true));
    }
    t.changes.remove_change(&table, ChangeNumber::new(8));
    let err = t
        .engine
        .reader()
        .range(&table, ChangeNumber::new(5), ChangeNumber::new(10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);

    // Ranges that do not cover the gap still read
    let records = t
        .engine
        .reader()
        .range(&table, ChangeNumber::new(8), ChangeNumber::new(11))
        .unwrap();
    assert_eq!(numbers(&records), vec![9, 10, 11]);
}

#[test]
fn missing_newest_change_is_io_failure() {
    let t = TestEngine::new();
    let table = TableId::new(42);
    for _ in 0..=10 {
        t.append(&table, search(true));
    }
    t.changes.remove_change(&table, ChangeNumber::new(10));
    let reader = t.engine.reader();
    let err = reader
        .range(&table, ChangeNumber::new(5), ChangeNumber::new(10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(reader.changes_after(&table, None).unwrap_err().is_io_failure());

    // The next append lands after the lost change; the gap stays visible
    assert_eq!(t.append(&table, search(false)), ChangeNumber::new(11));
    let err = reader
        .range(&table, ChangeNumber::new(9), ChangeNumber::new(11))
        .unwrap_err();
    assert!(err.to_string().contains("change 10"));
}

#[test]
fn typed_payload_load() {
    let t = TestEngine::new();
    let table = TableId::new(1);
    t.append(&table, set_cell(1, 10, "x"));
    t.append(&table, add_column(10));

    let reader = t.engine.reader();
    let rows = reader.get(&table, ChangeNumber::new(0)).unwrap();
    let data = rows.load_payload::<SparseChangeSet>().unwrap();
    assert_eq!(data.change.row_count(), 1);

    let schema = reader.get(&table, ChangeNumber::new(1)).unwrap();
    let err = schema.load_payload::<SparseChangeSet>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(schema.load_payload::<SchemaChange>().is_ok());
}

#[test]
fn latest_of_kind_skips_other_kinds() {
    let t = TestEngine::new();
    let table = TableId::new(1);
    t.append(&table, set_cell(1, 10, "x"));
    t.append(&table, add_column(10));
    t.append(&table, search(true));
    t.append(&table, set_cell(2, 10, "y"));

    let reader = t.engine.reader();
    let latest_row = reader.latest_of_kind(&table, PayloadKind::Row).unwrap().unwrap();
    assert_eq!(latest_row.change_number(), ChangeNumber::new(3));
    let latest_column = reader.latest_of_kind(&table, PayloadKind::Column).unwrap().unwrap();
    assert_eq!(latest_column.change_number(), ChangeNumber::new(1));
}

#[test]
fn iteration_uses_configured_page_size() {
    let config = TabulaConfig {
        change_page_size: 4,
        ..TabulaConfig::default()
    };
    let t = TestEngine::with_config(config, 1);
    let table = TableId::new(1);
    for _ in 0..10 {
        t.append(&table, search(false));
    }
    let all: Vec<u64> = t
        .engine
        .reader()
        .iter(&table)
        .map(|r| r.unwrap().change_number().as_u64())
        .collect();
    assert_eq!(all, (0..10u64).collect::<Vec<_>>());
    assert_eq!(t.engine.reader().count(&table).unwrap(), 10);
}

#[test]
fn identical_payloads_share_fingerprint() {
    let t = TestEngine::new();
    let table = TableId::new(1);
    t.append(&table, add_column(5));
    t.append(&table, add_column(5));
    let reader = t.engine.reader();
    let a = reader.get(&table, ChangeNumber::new(0)).unwrap();
    let b = reader.get(&table, ChangeNumber::new(1)).unwrap();
    assert!(a.same_content(&b));

    let stored = t.changes.payload(&table, ChangeNumber::FIRST).unwrap().unwrap();
    assert_eq!(a.fingerprint(), tabula::fingerprint(&stored));
}
