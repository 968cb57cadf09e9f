//! Table type enumeration
//!
//! Every table-backed entity reports one of these types. Maintenance
//! dispatch is keyed on it, so the set is closed: adding a type means
//! adding a variant here and a binding in every registry.
//!
//! | Type | Rows come from |
//! |------|----------------|
//! | Table | appended row change sets |
//! | EntityView | entity hierarchy (scope closure) |
//! | SubmissionView | evaluation submissions |
//! | Dataset | explicit item list |
//! | DatasetCollection | explicit dataset list |
//! | MaterializedView | defining query over other tables |
//! | VirtualTable | defining query, evaluated on read |

use serde::{Deserialize, Serialize};
use std::fmt;

/// The table-backed entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    /// Plain table with user-appended rows
    Table,
    /// View over files/folders in a container scope
    EntityView,
    /// View over evaluation submissions
    SubmissionView,
    /// Curated list of entities
    Dataset,
    /// Curated list of datasets
    DatasetCollection,
    /// Query-defined view with a stored index
    MaterializedView,
    /// Query-defined view evaluated on read
    VirtualTable,
}

impl TableType {
    /// Number of table types
    pub const COUNT: usize = 7;

    /// All table types (for iteration)
    pub const ALL: [TableType; Self::COUNT] = [
        TableType::Table,
        TableType::EntityView,
        TableType::SubmissionView,
        TableType::Dataset,
        TableType::DatasetCollection,
        TableType::MaterializedView,
        TableType::VirtualTable,
    ];

    /// Dense index into `ALL`
    ///
    /// The match is exhaustive, so a new variant fails to compile here
    /// until it is given a slot.
    pub const fn ordinal(&self) -> usize {
        match self {
            TableType::Table => 0,
            TableType::EntityView => 1,
            TableType::SubmissionView => 2,
            TableType::Dataset => 3,
            TableType::DatasetCollection => 4,
            TableType::MaterializedView => 5,
            TableType::VirtualTable => 6,
        }
    }

    /// Short identifier (config files, logs)
    pub const fn id(&self) -> &'static str {
        match self {
            TableType::Table => "table",
            TableType::EntityView => "entityview",
            TableType::SubmissionView => "submissionview",
            TableType::Dataset => "dataset",
            TableType::DatasetCollection => "datasetcollection",
            TableType::MaterializedView => "materializedview",
            TableType::VirtualTable => "virtualtable",
        }
    }

    /// Parse from short identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Whether this is a view or dataset variant
    ///
    /// Query-defined types (materialized views, virtual tables) are not.
    pub const fn is_view(&self) -> bool {
        matches!(
            self,
            TableType::EntityView | TableType::SubmissionView | TableType::Dataset | TableType::DatasetCollection
        )
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
