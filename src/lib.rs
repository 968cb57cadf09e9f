//! Tabula - scope resolution and change-log maintenance for table views
//!
//! Tabula keeps table indexes in step with two sources of truth:
//! the entity hierarchy (which containers a view covers) and the per-table
//! change log (what happened to a table, in order).
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tabula::{Engine, TabulaConfig, TableId, TableType};
//!
//! let engine = Engine::new(&TabulaConfig::default(), hierarchy, scopes, changes, endpoints)?;
//!
//! // Every container a view watches, transitively
//! let closure = engine.resolve_closure(view_id)?;
//!
//! // Bring an index up to date with its change log
//! let summary = engine.apply_pending_changes(&TableId::new(123), TableType::Table)?;
//! ```
//!
//! # Architecture
//!
//! - `tabula-core`: identifiers, change payloads, errors, collaborator traits
//! - `tabula-storage`: in-memory collaborators (hierarchy, scopes, change log, index)
//! - `tabula-engine`: resolver, change log reader, registry, router, engine

pub use tabula_core::{
    ChangeAppender, ChangeData, ChangeKind, ChangeMetadata, ChangeNumber, ChangePayload, ChangeStore,
    ColumnChange, ContainerId, Error, ErrorKind, HierarchyLookup, IndexEndpoint, Limits, PayloadKind,
    Result, RowUpdate, SchemaChange, ScopeType, SearchChange, SparseChangeSet, TableChange, TableId,
    TableType, ViewId, ViewScope, ViewScopeStore,
};
pub use tabula_engine::{
    ApplyOutcome, ApplySummary, CancellationToken, ChangeIter, ChangeLogReader, ChangeRecord, Engine,
    IndexConnection, IndexConnectionRouter, MaintenanceStrategy, RegistryBuilder, ScopeResolver,
    TableEntityStrategy, TableTypeRegistry, TabulaConfig, ViewStrategy, CONFIG_FILE_NAME,
};
pub use tabula_storage::{fingerprint, ChangeLogStore, HierarchyStore, MemoryIndex, TableIndex, ViewScopes};
