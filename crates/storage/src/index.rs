//! MemoryIndex: in-memory index management endpoint
//!
//! Holds a materialized projection per table:
//! - rows: row id -> cell values by column id
//! - columns: current column ids
//! - search flag
//! - highest applied change number
//!
//! Stands in for a physical index database in tests and embedded use.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;

use tabula_core::{ChangeNumber, IndexEndpoint, Result, SparseChangeSet, TableChange, TableId};

/// Materialized index of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableIndex {
    /// Row id -> (column id -> value)
    pub rows: BTreeMap<u64, BTreeMap<u64, String>>,
    /// Current column ids
    pub columns: BTreeSet<u64>,
    /// Whether full-text search is enabled
    pub search_enabled: bool,
    /// Highest applied change
    pub max_applied: Option<ChangeNumber>,
}

impl TableIndex {
    fn apply_rows(&mut self, set: &SparseChangeSet) {
        for row in &set.rows {
            let cells = self.rows.entry(row.row_id).or_default();
            for (column, value) in &row.values {
                match value {
                    Some(v) => {
                        cells.insert(*column, v.clone());
                    }
                    None => {
                        cells.remove(column);
                    }
                }
            }
        }
        for row_id in &set.deleted_row_ids {
            self.rows.remove(row_id);
        }
    }

    fn apply(&mut self, change: &TableChange) {
        match change {
            TableChange::Row(set) => self.apply_rows(set),
            TableChange::Column(schema) => {
                for column_change in &schema.changes {
                    if let Some(old) = column_change.old_column_id {
                        self.columns.remove(&old);
                        for cells in self.rows.values_mut() {
                            cells.remove(&old);
                        }
                    }
                    if let Some(new) = column_change.new_column_id {
                        self.columns.insert(new);
                    }
                }
            }
            TableChange::Search(search) => self.search_enabled = search.search_enabled,
        }
    }
}

/// In-memory index endpoint
#[derive(Debug)]
pub struct MemoryIndex {
    name: String,
    tables: RwLock<HashMap<TableId, TableIndex>>,
}

impl MemoryIndex {
    /// Create an empty endpoint called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the index of `table_id`
    pub fn table(&self, table_id: &TableId) -> Option<TableIndex> {
        self.tables.read().get(table_id).cloned()
    }

    /// Number of indexed tables
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }
}

impl IndexEndpoint for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_change(&self, table_id: &TableId, change_number: ChangeNumber, change: &TableChange) -> Result<()> {
        let mut tables = self.tables.write();
        let index = tables.entry(*table_id).or_default();
        index.apply(change);
        index.max_applied = Some(index.max_applied.map_or(change_number, |m| m.max(change_number)));
        Ok(())
    }

    fn max_applied_change(&self, table_id: &TableId) -> Result<Option<ChangeNumber>> {
        Ok(self.tables.read().get(table_id).and_then(|t| t.max_applied))
    }

    fn delete_index(&self, table_id: &TableId) -> Result<()> {
        self.tables.write().remove(table_id);
        Ok(())
    }
}
