//! Index maintenance through the registry and router

use crate::common::*;
use tabula::{ApplySummary, IndexConnectionRouter, TableTypeRegistry};

#[test]
fn table_log_materializes_into_index() {
    let t = TestEngine::new();
    let table = TableId::new(7);
    t.append(&table, add_column(10));
    t.append(&table, set_cell(1, 10, "alpha"));
    t.append(&table, set_cell(2, 10, "beta"));
    t.append(&table, search(true));

    let summary = t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    assert_eq!(summary.applied, 4);
    assert_eq!(summary.last_change, Some(ChangeNumber::new(3)));

    let index = t.index_for(&table).table(&table).unwrap();
    assert_eq!(index.rows.len(), 2);
    assert_eq!(index.rows[&2][&10], "beta");
    assert!(index.search_enabled);
}

#[test]
fn second_run_applies_nothing() {
    let t = TestEngine::new();
    let table = TableId::new(7);
    t.append(&table, add_column(10));
    t.append(&table, set_cell(1, 10, "alpha"));

    t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    let before = t.index_for(&table).table(&table);
    let again = t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    assert_eq!(again, ApplySummary::default());
    assert_eq!(t.index_for(&table).table(&table), before);
}

#[test]
fn view_rejects_row_changes_and_keeps_earlier_work() {
    let t = TestEngine::new();
    let view = TableId::new(8);
    t.append(&view, add_column(1));
    t.append(&view, set_cell(1, 1, "x"));

    let err = t
        .engine
        .apply_pending_changes(&view, TableType::EntityView)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let index = t.index_for(&view).table(&view).unwrap();
    assert!(index.columns.contains(&1));
    assert_eq!(index.max_applied, Some(ChangeNumber::FIRST));
}

#[test]
fn materialized_views_are_excluded_by_default() {
    let t = TestEngine::new();
    let table = TableId::new(9);
    t.append(&table, add_column(1));
    let err = t
        .engine
        .apply_pending_changes(&table, TableType::MaterializedView)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(t.index_for(&table).table(&table).is_none());
}

#[test]
fn gap_in_pending_log_stops_the_run() {
    let t = TestEngine::new();
    let table = TableId::new(7);
    for c in 0..5 {
        t.append(&table, add_column(c));
    }
    t.changes.remove_change(&table, ChangeNumber::new(2));
    let err = t.engine.apply_pending_changes(&table, TableType::Table).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(t.index_for(&table).table(&table).is_none());
}

#[test]
fn missing_newest_change_stops_the_run() {
    let t = TestEngine::new();
    let table = TableId::new(7);
    t.append(&table, add_column(0));
    t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    for c in 1..4 {
        t.append(&table, add_column(c));
    }
    t.changes.remove_change(&table, ChangeNumber::new(3));

    let err = t.engine.apply_pending_changes(&table, TableType::Table).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    let index = t.index_for(&table).table(&table).unwrap();
    assert_eq!(index.max_applied, Some(ChangeNumber::FIRST));
    assert!(!index.columns.contains(&1));
}

#[test]
fn tables_spread_over_endpoints() {
    let t = TestEngine::with_config(TabulaConfig::default(), 3);
    for id in 0..6 {
        let table = TableId::new(id);
        t.append(&table, add_column(1));
        t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    }
    for index in &t.indexes {
        assert_eq!(index.table_count(), 2);
    }
    assert_eq!(
        t.engine.router().connect_str("syn4").unwrap().endpoint_name(),
        "idx-1"
    );
}

#[test]
fn deleted_index_is_rebuilt_from_the_log() {
    let t = TestEngine::new();
    let table = TableId::new(3);
    t.append(&table, add_column(1));
    t.append(&table, set_cell(1, 1, "a"));
    t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    let built = t.index_for(&table).table(&table);

    let connection = t.engine.router().connect(Some(&table)).unwrap();
    connection.delete_index().unwrap();
    assert!(t.index_for(&table).table(&table).is_none());

    let summary = t.engine.apply_pending_changes(&table, TableType::Table).unwrap();
    assert_eq!(summary.applied, 2);
    assert_eq!(t.index_for(&table).table(&table), built);
}

#[test]
fn custom_registry_from_builder() {
    let t = TestEngine::new();
    let router = t.engine.router().clone();
    let registry = TableTypeRegistry::with_defaults(router, &TableType::ALL).unwrap();
    assert!(registry.bound_types().is_empty());

    let err = TableTypeRegistry::builder().build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    for table_type in TableType::ALL {
        assert!(err.to_string().contains(table_type.id()));
    }
}

#[test]
fn router_requires_endpoints() {
    let err = IndexConnectionRouter::new(Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn engine_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(tabula::CONFIG_FILE_NAME);
    std::fs::write(&path, "unsupported_table_types = [\"virtualtable\"]\n").unwrap();
    let config = TabulaConfig::from_file(&path).unwrap();

    let t = TestEngine::with_config(config, 1);
    let registry = t.engine.registry();
    assert_eq!(registry.excluded(), vec![TableType::VirtualTable]);
    assert!(registry.is_supported(TableType::MaterializedView));
}
