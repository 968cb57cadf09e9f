//! Core identifier types for Tabula
//!
//! This module defines the foundational types:
//! - ContainerId: a project/folder-like entity that can hold children
//! - ViewId: a view, mapped 1:1 to its declared ViewScope
//! - TableId: a table-backed entity, optionally pinned to a snapshot version
//! - ChangeNumber: per-table ordinal of a change-log entry
//! - ViewScope: the declared watch-list of a view

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Prefix used when rendering entity ids
pub const ID_PREFIX: &str = "syn";

/// Identifier of a container entity (project or folder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Wrap a raw numeric id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric id
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ContainerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewId(u64);

impl ViewId {
    /// Wrap a raw numeric id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric id
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a table-backed entity
///
/// A TableId names a table, view, dataset, or other table-backed entity.
/// The optional version pins a snapshot of that entity; `None` means the
/// current (unversioned) state.
///
/// # Parsing
///
/// Accepts `"123"`, `"syn123"`, and `"syn123.4"` (case-insensitive prefix).
/// Blank or malformed strings fail with `InvalidArgument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId {
    id: u64,
    version: Option<u64>,
}

impl TableId {
    /// Current state of table `id`
    pub const fn new(id: u64) -> Self {
        Self { id, version: None }
    }

    /// Snapshot `version` of table `id`
    pub const fn with_version(id: u64, version: u64) -> Self {
        Self {
            id,
            version: Some(version),
        }
    }

    /// Numeric entity id
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Snapshot version, if pinned
    pub const fn version(&self) -> Option<u64> {
        self.version
    }

    /// Parse a table id string
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the string is blank or malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("table id is required"));
        }
        let body = match trimmed.get(..ID_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(ID_PREFIX) => &trimmed[ID_PREFIX.len()..],
            _ => trimmed,
        };
        let malformed = || Error::invalid_argument(format!("malformed table id '{}'", raw));
        match body.split_once('.') {
            Some((id, version)) => Ok(Self::with_version(
                id.parse().map_err(|_| malformed())?,
                version.parse().map_err(|_| malformed())?,
            )),
            None => Ok(Self::new(body.parse().map_err(|_| malformed())?)),
        }
    }
}

impl FromStr for TableId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}{}.{}", ID_PREFIX, self.id, v),
            None => write!(f, "{}{}", ID_PREFIX, self.id),
        }
    }
}

/// Ordinal of a change within one table's change log
///
/// Assigned at append time starting from zero, never reused, never decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeNumber(u64);

impl ChangeNumber {
    /// First change number of every table
    pub const FIRST: ChangeNumber = ChangeNumber(0);

    /// Wrap a raw ordinal
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Raw ordinal
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The following change number
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for ChangeNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for ChangeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a view's declared containers expand into its closure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScopeType {
    /// Containers plus all transitive descendant containers
    #[default]
    Hierarchical,
    /// The declared containers are projects and are the closure themselves
    ProjectsOnly,
}

/// Declared scope of a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewScope {
    /// Top-level containers the view watches
    pub container_ids: BTreeSet<ContainerId>,
    /// Expansion rule
    pub scope_type: ScopeType,
}

impl ViewScope {
    /// Hierarchical scope over `container_ids`
    pub fn new(container_ids: impl IntoIterator<Item = ContainerId>) -> Self {
        Self {
            container_ids: container_ids.into_iter().collect(),
            scope_type: ScopeType::Hierarchical,
        }
    }

    /// Projects-only scope over `project_ids`
    pub fn projects(project_ids: impl IntoIterator<Item = ContainerId>) -> Self {
        Self {
            container_ids: project_ids.into_iter().collect(),
            scope_type: ScopeType::ProjectsOnly,
        }
    }

    /// Number of declared containers
    pub fn len(&self) -> usize {
        self.container_ids.len()
    }

    /// Whether no containers are declared
    pub fn is_empty(&self) -> bool {
        self.container_ids.is_empty()
    }
}
