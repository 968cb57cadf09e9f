//! Table maintenance engine for Tabula
//!
//! This crate orchestrates the collaborator stores:
//! - ScopeResolver: transitive scope closure of a view
//! - ChangeLogReader / ChangeRecord: ordered, lazily loaded change logs
//! - TableTypeRegistry: per-table-type maintenance strategies
//! - IndexConnectionRouter: table id -> index endpoint
//! - Engine: wires the above from a `TabulaConfig`
//!
//! The engine is the only component that knows how a change record
//! travels from the log to an index.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod change_log;
pub mod config;
pub mod engine;
pub mod registry;
pub mod router;
pub mod scope;
pub mod strategy;

pub use cancel::CancellationToken;
pub use change_log::{ChangeIter, ChangeLogReader, ChangeRecord};
pub use config::{TabulaConfig, CONFIG_FILE_NAME};
pub use engine::{ApplySummary, Engine};
pub use registry::{ApplyOutcome, MaintenanceStrategy, RegistryBuilder, TableTypeRegistry};
pub use router::{IndexConnection, IndexConnectionRouter};
pub use scope::ScopeResolver;
pub use strategy::{TableEntityStrategy, ViewStrategy};
