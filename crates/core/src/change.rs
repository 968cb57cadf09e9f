//! Change-log entry types
//!
//! A table's change log is a sequence of [`ChangeMetadata`] entries, each
//! pointing at a stored [`TableChange`] payload. Payloads are a closed
//! tagged union; typed access goes through [`ChangePayload`], which checks
//! the stored kind before decoding and never casts blindly.

use crate::types::{ChangeNumber, TableId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Message-level kind of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Entity or rows created
    Create,
    /// Entity or rows modified
    Update,
    /// Entity or rows removed
    Delete,
}

/// What a change payload holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    /// Sparse row change set
    Row,
    /// Schema (column) change
    Column,
    /// Full-text search toggle
    Search,
}

impl PayloadKind {
    /// Short identifier
    pub const fn id(&self) -> &'static str {
        match self {
            PayloadKind::Row => "row",
            PayloadKind::Column => "column",
            PayloadKind::Search => "search",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One row written by a change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowUpdate {
    /// Row identifier
    pub row_id: u64,
    /// Row version the writer observed, if any
    pub version_number: Option<u64>,
    /// Cell values keyed by column id; `None` clears the cell
    pub values: BTreeMap<u64, Option<String>>,
}

/// Sparse set of row writes and deletes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SparseChangeSet {
    /// Upserted rows
    pub rows: Vec<RowUpdate>,
    /// Deleted row ids
    pub deleted_row_ids: Vec<u64>,
}

impl SparseChangeSet {
    /// Number of rows touched (written or deleted)
    pub fn row_count(&self) -> usize {
        self.rows.len() + self.deleted_row_ids.len()
    }
}

/// Replacement of one column by another
///
/// `old_column_id == None` adds a column; `new_column_id == None` drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    /// Column being replaced
    pub old_column_id: Option<u64>,
    /// Replacement column
    pub new_column_id: Option<u64>,
}

/// Schema change
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaChange {
    /// Column replacements, in application order
    pub changes: Vec<ColumnChange>,
}

/// Full-text search enablement change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchChange {
    /// Whether search is enabled after this change
    pub search_enabled: bool,
}

/// Stored change payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableChange {
    /// Row writes
    Row(SparseChangeSet),
    /// Column changes
    Column(SchemaChange),
    /// Search toggle
    Search(SearchChange),
}

impl TableChange {
    /// Kind of this payload
    pub fn kind(&self) -> PayloadKind {
        match self {
            TableChange::Row(_) => PayloadKind::Row,
            TableChange::Column(_) => PayloadKind::Column,
            TableChange::Search(_) => PayloadKind::Search,
        }
    }
}

/// Metadata of one change-log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetadata {
    /// Owning table
    pub table_id: TableId,
    /// Position in the table's log
    pub change_number: ChangeNumber,
    /// Message-level kind
    pub change_kind: ChangeKind,
    /// Kind of the stored payload
    pub payload_kind: PayloadKind,
    /// Content fingerprint of the stored payload
    pub fingerprint: String,
    /// Append time
    pub created_on: DateTime<Utc>,
}

/// A loaded payload together with its change number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeData<T> {
    /// Change the payload belongs to
    pub change_number: ChangeNumber,
    /// Typed payload
    pub change: T,
}

/// A type a change payload can be loaded as
pub trait ChangePayload: Sized {
    /// Type name used in mismatch errors
    const NAME: &'static str;

    /// Whether a stored payload of `kind` can be loaded as `Self`
    fn accepts(kind: PayloadKind) -> bool;

    /// Extract `Self` from a decoded payload, or `None` on a kind mismatch
    fn from_change(change: TableChange) -> Option<Self>;
}

impl ChangePayload for TableChange {
    const NAME: &'static str = "TableChange";

    fn accepts(_kind: PayloadKind) -> bool {
        true
    }

    fn from_change(change: TableChange) -> Option<Self> {
        Some(change)
    }
}

impl ChangePayload for SparseChangeSet {
    const NAME: &'static str = "SparseChangeSet";

    fn accepts(kind: PayloadKind) -> bool {
        kind == PayloadKind::Row
    }

    fn from_change(change: TableChange) -> Option<Self> {
        match change {
            TableChange::Row(set) => Some(set),
            _ => None,
        }
    }
}

impl ChangePayload for SchemaChange {
    const NAME: &'static str = "SchemaChange";

    fn accepts(kind: PayloadKind) -> bool {
        kind == PayloadKind::Column
    }

    fn from_change(change: TableChange) -> Option<Self> {
        match change {
            TableChange::Column(schema) => Some(schema),
            _ => None,
        }
    }
}

impl ChangePayload for SearchChange {
    const NAME: &'static str = "SearchChange";

    fn accepts(kind: PayloadKind) -> bool {
        kind == PayloadKind::Search
    }

    fn from_change(change: TableChange) -> Option<Self> {
        match change {
            TableChange::Search(search) => Some(search),
            _ => None,
        }
    }
}
