//! Core types and traits for Tabula
//!
//! This crate defines the foundational types used throughout the system:
//! - ContainerId, ViewId, TableId, ChangeNumber: identifiers
//! - TableType: closed enumeration of table-backed entity types
//! - ViewScope: a view's declared watch-list
//! - TableChange: tagged union of change payloads (row, column, search)
//! - Error: error taxonomy shared by every layer
//! - Limits: tunable bounds enforced by the engine
//! - Traits: collaborator interfaces (hierarchy, view scopes, change store, index endpoint)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod error;
pub mod limits;
pub mod table_type;
pub mod traits;
pub mod types;

pub use change::{
    ChangeData, ChangeKind, ChangeMetadata, ChangePayload, ColumnChange, PayloadKind, RowUpdate,
    SchemaChange, SearchChange, SparseChangeSet, TableChange,
};
pub use error::{Error, ErrorKind, Result};
pub use limits::Limits;
pub use table_type::TableType;
pub use traits::{ChangeAppender, ChangeStore, HierarchyLookup, IndexEndpoint, ViewScopeStore};
pub use types::{ChangeNumber, ContainerId, ScopeType, TableId, ViewId, ViewScope};
