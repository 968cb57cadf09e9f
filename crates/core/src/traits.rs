//! Collaborator traits
//!
//! The engine never talks to a concrete store. Each external system it
//! depends on is described by one trait here, so in-memory, SQL-backed, or
//! remote implementations can be swapped without touching the engine.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync). Timeouts and retries are the
//! implementation's concern; the engine never retries.

use crate::change::{ChangeKind, ChangeMetadata, PayloadKind, TableChange};
use crate::error::Result;
use crate::types::{ChangeNumber, ContainerId, TableId, ViewId, ViewScope};
use std::collections::BTreeSet;

/// Authoritative entity hierarchy
pub trait HierarchyLookup: Send + Sync {
    /// Ids of the containers directly under `container_id`
    ///
    /// Returns an empty set for leaf or unknown containers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn direct_child_container_ids(&self, container_id: ContainerId) -> Result<BTreeSet<ContainerId>>;
}

/// Persistence of declared view scopes
pub trait ViewScopeStore: Send + Sync {
    /// Declared scope of `view_id`, or None if the view has none
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn scope(&self, view_id: ViewId) -> Result<Option<ViewScope>>;
}

/// Read side of a per-table change log
///
/// Implementations return what is stored; ordering and gap checks are
/// done by the reader on top of this trait.
pub trait ChangeStore: Send + Sync {
    /// Most recent change of `table_id`
    fn last_change(&self, table_id: &TableId) -> Result<Option<ChangeMetadata>>;

    /// Most recent change of `table_id` carrying a `kind` payload
    fn last_change_of_kind(&self, table_id: &TableId, kind: PayloadKind) -> Result<Option<ChangeMetadata>>;

    /// Metadata of one change
    fn change(&self, table_id: &TableId, change_number: ChangeNumber) -> Result<Option<ChangeMetadata>>;

    /// Stored changes with `from_exclusive < number <= to_inclusive`, ascending
    fn changes_in_range(
        &self,
        table_id: &TableId,
        from_exclusive: ChangeNumber,
        to_inclusive: ChangeNumber,
    ) -> Result<Vec<ChangeMetadata>>;

    /// Up to `limit` stored changes after skipping `offset`, ascending
    fn change_page(&self, table_id: &TableId, limit: usize, offset: usize) -> Result<Vec<ChangeMetadata>>;

    /// Number of stored changes
    fn change_count(&self, table_id: &TableId) -> Result<u64>;

    /// Change number the next append to `table_id` will receive
    ///
    /// This is the appended high-water mark: every number below it was
    /// handed out, whether or not it is still stored. `FIRST` for a table
    /// that never had a change.
    fn next_change_number(&self, table_id: &TableId) -> Result<ChangeNumber>;

    /// Encoded payload of one change, or None if purged
    ///
    /// Integrity checks on the bytes, if any, belong to the store. The
    /// fingerprint is opaque to callers.
    fn payload(&self, table_id: &TableId, change_number: ChangeNumber) -> Result<Option<Vec<u8>>>;
}

/// Producer side of a per-table change log
pub trait ChangeAppender: Send + Sync {
    /// Append `change` to the log of `table_id`
    ///
    /// Assigns the next change number and the content fingerprint.
    fn append(&self, table_id: &TableId, change_kind: ChangeKind, change: &TableChange) -> Result<ChangeMetadata>;
}

/// One physical index management backend
pub trait IndexEndpoint: Send + Sync {
    /// Endpoint name (logs, diagnostics)
    fn name(&self) -> &str;

    /// Apply a change to the index of `table_id`
    fn apply_change(&self, table_id: &TableId, change_number: ChangeNumber, change: &TableChange) -> Result<()>;

    /// Highest change number applied to the index of `table_id`
    fn max_applied_change(&self, table_id: &TableId) -> Result<Option<ChangeNumber>>;

    /// Drop the index of `table_id`
    fn delete_index(&self, table_id: &TableId) -> Result<()>;
}
