//! ChangeLogStore: in-memory per-table change logs
//!
//! Implements both sides of the change log:
//! - ChangeAppender: assigns the next change number, encodes the payload
//!   with MessagePack, and fingerprints the encoded bytes
//! - ChangeStore: metadata and payload reads; payload bytes are checked
//!   against the fingerprint assigned at append
//!
//! # Design Notes
//!
//! - Change numbers start at 0 per table and are never reused, even after
//!   an entry is removed.
//! - Metadata and payloads are kept apart so a purged payload can be
//!   represented (metadata present, payload gone).
//! - One `RwLock` guards all tables; every read is a single acquisition.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, warn};

use tabula_core::{
    ChangeAppender, ChangeKind, ChangeMetadata, ChangeNumber, ChangeStore, Error, PayloadKind, Result,
    TableChange, TableId,
};

use crate::fingerprint::fingerprint;

/// Change log of one table
#[derive(Debug, Default)]
struct TableLog {
    /// Next change number to assign
    next: u64,
    /// Metadata by change number
    entries: BTreeMap<ChangeNumber, ChangeMetadata>,
    /// Encoded payloads by change number
    payloads: HashMap<ChangeNumber, Vec<u8>>,
}

/// In-memory change log store
#[derive(Debug, Default)]
pub struct ChangeLogStore {
    tables: RwLock<HashMap<TableId, TableLog>>,
}

impl ChangeLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the payload of one change, keeping its metadata
    ///
    /// Returns true if a payload was removed.
    pub fn purge_payload(&self, table_id: &TableId, change_number: ChangeNumber) -> bool {
        self.tables
            .write()
            .get_mut(table_id)
            .map(|log| log.payloads.remove(&change_number).is_some())
            .unwrap_or(false)
    }

    /// Drop one change entirely (metadata and payload)
    ///
    /// The change number is not reused; readers will see a gap.
    pub fn remove_change(&self, table_id: &TableId, change_number: ChangeNumber) -> bool {
        let mut tables = self.tables.write();
        match tables.get_mut(table_id) {
            Some(log) => {
                log.payloads.remove(&change_number);
                log.entries.remove(&change_number).is_some()
            }
            None => false,
        }
    }

    /// Overwrite the stored payload bytes of one change
    ///
    /// Metadata (including the fingerprint) is left untouched.
    pub fn overwrite_payload(&self, table_id: &TableId, change_number: ChangeNumber, bytes: Vec<u8>) -> bool {
        let mut tables = self.tables.write();
        match tables.get_mut(table_id) {
            Some(log) if log.entries.contains_key(&change_number) => {
                log.payloads.insert(change_number, bytes);
                true
            }
            _ => false,
        }
    }

    /// Drop the whole log of `table_id`
    pub fn delete_table(&self, table_id: &TableId) -> bool {
        self.tables.write().remove(table_id).is_some()
    }
}

impl ChangeAppender for ChangeLogStore {
    fn append(&self, table_id: &TableId, change_kind: ChangeKind, change: &TableChange) -> Result<ChangeMetadata> {
        // Encode outside the lock
        let encoded = rmp_serde::to_vec(change)?;
        let fingerprint = fingerprint(&encoded);

        let mut tables = self.tables.write();
        let log = tables.entry(*table_id).or_default();
        let change_number = ChangeNumber::new(log.next);
        log.next += 1;

        let metadata = ChangeMetadata {
            table_id: *table_id,
            change_number,
            change_kind,
            payload_kind: change.kind(),
            fingerprint,
            created_on: Utc::now(),
        };
        log.entries.insert(change_number, metadata.clone());
        log.payloads.insert(change_number, encoded);

        debug!(
            table_id = %table_id,
            change_number = change_number.as_u64(),
            payload_kind = %metadata.payload_kind,
            "Appended change"
        );
        Ok(metadata)
    }
}

impl ChangeStore for ChangeLogStore {
    fn last_change(&self, table_id: &TableId) -> Result<Option<ChangeMetadata>> {
        Ok(self
            .tables
            .read()
            .get(table_id)
            .and_then(|log| log.entries.values().next_back().cloned()))
    }

    fn last_change_of_kind(&self, table_id: &TableId, kind: PayloadKind) -> Result<Option<ChangeMetadata>> {
        Ok(self.tables.read().get(table_id).and_then(|log| {
            log.entries
                .values()
                .rev()
                .find(|m| m.payload_kind == kind)
                .cloned()
        }))
    }

    fn change(&self, table_id: &TableId, change_number: ChangeNumber) -> Result<Option<ChangeMetadata>> {
        Ok(self
            .tables
            .read()
            .get(table_id)
            .and_then(|log| log.entries.get(&change_number).cloned()))
    }

    fn changes_in_range(
        &self,
        table_id: &TableId,
        from_exclusive: ChangeNumber,
        to_inclusive: ChangeNumber,
    ) -> Result<Vec<ChangeMetadata>> {
        if from_exclusive >= to_inclusive {
            return Ok(Vec::new());
        }
        let tables = self.tables.read();
        Ok(tables
            .get(table_id)
            .map(|log| {
                log.entries
                    .range((Bound::Excluded(from_exclusive), Bound::Included(to_inclusive)))
                    .map(|(_, m)| m.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn change_page(&self, table_id: &TableId, limit: usize, offset: usize) -> Result<Vec<ChangeMetadata>> {
        Ok(self
            .tables
            .read()
            .get(table_id)
            .map(|log| log.entries.values().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn change_count(&self, table_id: &TableId) -> Result<u64> {
        Ok(self
            .tables
            .read()
            .get(table_id)
            .map(|log| log.entries.len() as u64)
            .unwrap_or(0))
    }

    fn next_change_number(&self, table_id: &TableId) -> Result<ChangeNumber> {
        Ok(ChangeNumber::new(
            self.tables.read().get(table_id).map(|log| log.next).unwrap_or(0),
        ))
    }

    fn payload(&self, table_id: &TableId, change_number: ChangeNumber) -> Result<Option<Vec<u8>>> {
        let tables = self.tables.read();
        let Some(log) = tables.get(table_id) else {
            return Ok(None);
        };
        let (Some(bytes), Some(metadata)) = (log.payloads.get(&change_number), log.entries.get(&change_number))
        else {
            return Ok(None);
        };
        if fingerprint(bytes) != metadata.fingerprint {
            warn!(table_id = %table_id, change_number = change_number.as_u64(), "Payload fingerprint mismatch");
            return Err(Error::corruption(format!(
                "payload of change {} of table {} does not match its fingerprint",
                change_number, table_id
            )));
        }
        Ok(Some(bytes.clone()))
    }
}
