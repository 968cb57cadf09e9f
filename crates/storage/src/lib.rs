//! In-memory collaborator stores for Tabula
//!
//! This crate implements every collaborator trait from `tabula-core` with
//! `parking_lot::RwLock`-guarded maps:
//! - HierarchyStore: container containment (HierarchyLookup)
//! - ViewScopes: declared view scopes (ViewScopeStore)
//! - ChangeLogStore: per-table change logs (ChangeStore + ChangeAppender)
//! - MemoryIndex: index management endpoint (IndexEndpoint)
//!
//! Each read takes one lock acquisition, so a single call always observes
//! a consistent snapshot.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change_log;
pub mod fingerprint;
pub mod hierarchy;
pub mod index;
pub mod view_scope;

pub use change_log::ChangeLogStore;
pub use fingerprint::fingerprint;
pub use hierarchy::HierarchyStore;
pub use index::{MemoryIndex, TableIndex};
pub use view_scope::ViewScopes;
