//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

pub use tabula::{
    ChangeAppender, ChangeKind, ChangeLogStore, ChangeNumber, ColumnChange, ContainerId, Engine,
    ErrorKind, HierarchyStore, IndexEndpoint, MemoryIndex, RowUpdate, SchemaChange, SearchChange,
    SparseChangeSet, TableChange, TableId, TableType, TabulaConfig, ViewId, ViewScope, ViewScopes,
};

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::WARN)
            .try_init();
    });
}

pub fn ids(raw: &[u64]) -> std::collections::BTreeSet<ContainerId> {
    raw.iter().copied().map(ContainerId::new).collect()
}

/// Engine over in-memory stores, with handles to each store.
pub struct TestEngine {
    pub engine: Engine,
    pub hierarchy: Arc<HierarchyStore>,
    pub scopes: Arc<ViewScopes>,
    pub changes: Arc<ChangeLogStore>,
    pub indexes: Vec<Arc<MemoryIndex>>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(TabulaConfig::default(), 1)
    }

    pub fn with_config(config: TabulaConfig, endpoint_count: usize) -> Self {
        init_tracing();
        let hierarchy = Arc::new(HierarchyStore::new());
        let scopes = Arc::new(ViewScopes::new());
        let changes = Arc::new(ChangeLogStore::new());
        let indexes: Vec<Arc<MemoryIndex>> = (0..endpoint_count)
            .map(|i| Arc::new(MemoryIndex::new(format!("idx-{}", i))))
            .collect();
        let endpoints = indexes
            .iter()
            .map(|i| Arc::clone(i) as Arc<dyn IndexEndpoint>)
            .collect();
        let engine = Engine::new(
            &config,
            hierarchy.clone(),
            scopes.clone(),
            changes.clone(),
            endpoints,
        )
        .expect("engine construction");
        TestEngine {
            engine,
            hierarchy,
            scopes,
            changes,
            indexes,
        }
    }

    /// Add parent -> child edges.
    pub fn edges(&self, edges: &[(u64, u64)]) {
        for (parent, child) in edges {
            self.hierarchy
                .add_child(ContainerId::new(*parent), ContainerId::new(*child));
        }
    }

    pub fn declare(&self, view: u64, containers: &[u64]) {
        self.scopes.set_scope(ViewId::new(view), ViewScope::new(ids(containers)));
    }

    pub fn append(&self, table: &TableId, change: TableChange) -> ChangeNumber {
        self.changes
            .append(table, ChangeKind::Update, &change)
            .expect("append")
            .change_number
    }

    /// Index endpoint that serves `table` (single-endpoint setups use index 0).
    pub fn index_for(&self, table: &TableId) -> &MemoryIndex {
        let slot = (table.id() % self.indexes.len() as u64) as usize;
        &self.indexes[slot]
    }
}

pub fn add_column(id: u64) -> TableChange {
    TableChange::Column(SchemaChange {
        changes: vec![ColumnChange {
            old_column_id: None,
            new_column_id: Some(id),
        }],
    })
}

pub fn set_cell(row_id: u64, column: u64, value: &str) -> TableChange {
    TableChange::Row(SparseChangeSet {
        rows: vec![RowUpdate {
            row_id,
            version_number: None,
            values: [(column, Some(value.to_string()))].into_iter().collect(),
        }],
        deleted_row_ids: vec![],
    })
}

pub fn search(enabled: bool) -> TableChange {
    TableChange::Search(SearchChange {
        search_enabled: enabled,
    })
}
