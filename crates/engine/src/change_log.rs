//! ChangeLogReader: ordered, lazily materialized change logs
//!
//! ## Records
//!
//! A [`ChangeRecord`] carries the metadata of one change and loads its
//! payload on demand. Typed loads check the declared payload kind before
//! touching storage; the decoded payload is checked against the declared
//! kind, then cached for later loads. The fingerprint is passed through
//! untouched.
//!
//! ## Ranges
//!
//! Change numbers are dense per table. A range read expects every number
//! between its bounds (clamped to the newest appended change, stored or
//! not) and reports any missing one as corruption instead of skipping it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tabula_core::{
    ChangeData, ChangeKind, ChangeMetadata, ChangeNumber, ChangePayload, ChangeStore, Error, Limits,
    PayloadKind, Result, TableChange, TableId,
};
use tracing::warn;

/// One immutable entry of a table's change log
#[derive(Clone)]
pub struct ChangeRecord {
    metadata: ChangeMetadata,
    store: Arc<dyn ChangeStore>,
    payload: OnceCell<TableChange>,
}

impl ChangeRecord {
    /// Wrap stored metadata; the payload is read from `store` on first load
    pub fn new(metadata: ChangeMetadata, store: Arc<dyn ChangeStore>) -> Self {
        Self {
            metadata,
            store,
            payload: OnceCell::new(),
        }
    }

    /// Owning table
    pub fn table_id(&self) -> &TableId {
        &self.metadata.table_id
    }

    /// Position in the log
    pub fn change_number(&self) -> ChangeNumber {
        self.metadata.change_number
    }

    /// Message-level kind
    pub fn change_kind(&self) -> ChangeKind {
        self.metadata.change_kind
    }

    /// Declared payload kind
    pub fn payload_kind(&self) -> PayloadKind {
        self.metadata.payload_kind
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> &str {
        &self.metadata.fingerprint
    }

    /// Append time
    pub fn created_on(&self) -> DateTime<Utc> {
        self.metadata.created_on
    }

    /// Stored metadata
    pub fn metadata(&self) -> &ChangeMetadata {
        &self.metadata
    }

    /// Whether both records carry identical payload content
    pub fn same_content(&self, other: &ChangeRecord) -> bool {
        self.metadata.fingerprint == other.metadata.fingerprint
    }

    /// Whether the payload has already been loaded
    pub fn is_loaded(&self) -> bool {
        self.payload.get().is_some()
    }

    /// Load the payload as `T`
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if `T` cannot hold this record's payload kind
    /// - `NotFound` if the payload has been purged
    /// - `Serialization` / `Corruption` if the stored bytes do not decode
    ///   to the declared payload
    pub fn load_payload<T: ChangePayload>(&self) -> Result<ChangeData<T>> {
        if !T::accepts(self.metadata.payload_kind) {
            return Err(self.mismatch::<T>());
        }
        let change = self.payload.get_or_try_init(|| self.fetch())?;
        let change = T::from_change(change.clone()).ok_or_else(|| self.mismatch::<T>())?;
        Ok(ChangeData {
            change_number: self.metadata.change_number,
            change,
        })
    }

    fn mismatch<T: ChangePayload>(&self) -> Error {
        Error::TypeMismatch {
            expected: T::NAME,
            actual: self.metadata.payload_kind,
        }
    }

    fn fetch(&self) -> Result<TableChange> {
        let table_id = &self.metadata.table_id;
        let number = self.metadata.change_number;
        let bytes = self.store.payload(table_id, number)?.ok_or_else(|| {
            Error::not_found(format!("payload of change {} of table {} is missing", number, table_id))
        })?;
        let change: TableChange = rmp_serde::from_slice(&bytes)?;
        if change.kind() != self.metadata.payload_kind {
            return Err(Error::corruption(format!(
                "change {} of table {} declares a {} payload but stores {}",
                number,
                table_id,
                self.metadata.payload_kind,
                change.kind()
            )));
        }
        Ok(change)
    }
}

impl fmt::Debug for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRecord")
            .field("table_id", &self.metadata.table_id)
            .field("change_number", &self.metadata.change_number)
            .field("change_kind", &self.metadata.change_kind)
            .field("payload_kind", &self.metadata.payload_kind)
            .field("fingerprint", &self.metadata.fingerprint)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Read access to per-table change logs
#[derive(Clone)]
pub struct ChangeLogReader {
    store: Arc<dyn ChangeStore>,
    page_size: usize,
}

impl ChangeLogReader {
    /// Create a reader with the default page size
    pub fn new(store: Arc<dyn ChangeStore>) -> Self {
        Self {
            store,
            page_size: Limits::default().change_page_size,
        }
    }

    /// Replace the page size used by [`iter`](Self::iter)
    ///
    /// A zero page size is raised to one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn record(&self, metadata: ChangeMetadata) -> ChangeRecord {
        ChangeRecord::new(metadata, Arc::clone(&self.store))
    }

    /// Newest change of `table_id`
    pub fn latest(&self, table_id: &TableId) -> Result<Option<ChangeRecord>> {
        Ok(self.store.last_change(table_id)?.map(|m| self.record(m)))
    }

    /// Newest change of `table_id` carrying a `kind` payload
    pub fn latest_of_kind(&self, table_id: &TableId, kind: PayloadKind) -> Result<Option<ChangeRecord>> {
        Ok(self
            .store
            .last_change_of_kind(table_id, kind)?
            .map(|m| self.record(m)))
    }

    /// One change by number
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the change does not exist.
    pub fn get(&self, table_id: &TableId, change_number: ChangeNumber) -> Result<ChangeRecord> {
        self.store
            .change(table_id, change_number)?
            .map(|m| self.record(m))
            .ok_or_else(|| {
                Error::not_found(format!("change {} of table {} does not exist", change_number, table_id))
            })
    }

    /// Changes with `from_exclusive < number <= to_inclusive`, ascending
    ///
    /// The upper bound is clamped to the newest appended change.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `from_exclusive > to_inclusive`
    /// - `Corruption` if any change number inside the range is missing
    pub fn range(
        &self,
        table_id: &TableId,
        from_exclusive: ChangeNumber,
        to_inclusive: ChangeNumber,
    ) -> Result<Vec<ChangeRecord>> {
        if from_exclusive > to_inclusive {
            return Err(Error::invalid_argument(format!(
                "range start {} is after range end {}",
                from_exclusive, to_inclusive
            )));
        }
        self.contiguous(table_id, Some(from_exclusive), to_inclusive)
    }

    /// Every change after `after` (or the whole log for `None`), ascending
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if any change number is missing.
    pub fn changes_after(&self, table_id: &TableId, after: Option<ChangeNumber>) -> Result<Vec<ChangeRecord>> {
        self.contiguous(table_id, after, ChangeNumber::new(u64::MAX))
    }

    fn contiguous(
        &self,
        table_id: &TableId,
        after: Option<ChangeNumber>,
        to_inclusive: ChangeNumber,
    ) -> Result<Vec<ChangeRecord>> {
        let next = self.store.next_change_number(table_id)?;
        if next == ChangeNumber::FIRST {
            return Ok(Vec::new());
        }
        let upper = to_inclusive.min(ChangeNumber::new(next.as_u64() - 1));
        let first = match after {
            Some(from) if from >= upper => return Ok(Vec::new()),
            Some(from) => from.next(),
            None => ChangeNumber::FIRST,
        };

        let entries = match after {
            Some(from) => self.store.changes_in_range(table_id, from, upper)?,
            None => {
                let mut entries = Vec::new();
                if let Some(m) = self.store.change(table_id, ChangeNumber::FIRST)? {
                    entries.push(m);
                }
                if upper > ChangeNumber::FIRST {
                    entries.extend(self.store.changes_in_range(table_id, ChangeNumber::FIRST, upper)?);
                }
                entries
            }
        };

        let mut expected = first;
        for metadata in &entries {
            if metadata.change_number != expected || metadata.table_id != *table_id {
                return Err(self.gap(table_id, expected));
            }
            expected = expected.next();
        }
        if expected <= upper {
            return Err(self.gap(table_id, expected));
        }
        Ok(entries.into_iter().map(|m| self.record(m)).collect())
    }

    fn gap(&self, table_id: &TableId, missing: ChangeNumber) -> Error {
        warn!(table_id = %table_id, change_number = missing.as_u64(), "Gap in change log");
        Error::corruption(format!("change {} of table {} is missing from the log", missing, table_id))
    }

    /// Up to `limit` changes after skipping `offset`, ascending
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `limit` is zero.
    pub fn page(&self, table_id: &TableId, limit: usize, offset: usize) -> Result<Vec<ChangeRecord>> {
        if limit == 0 {
            return Err(Error::invalid_argument("page limit must be at least 1"));
        }
        Ok(self
            .store
            .change_page(table_id, limit, offset)?
            .into_iter()
            .map(|m| self.record(m))
            .collect())
    }

    /// Number of stored changes of `table_id`
    pub fn count(&self, table_id: &TableId) -> Result<u64> {
        self.store.change_count(table_id)
    }

    /// Iterate the whole log of `table_id`, one page at a time
    pub fn iter(&self, table_id: &TableId) -> ChangeIter {
        ChangeIter {
            reader: self.clone(),
            table_id: *table_id,
            offset: 0,
            buffer: VecDeque::new(),
            done: false,
        }
    }
}

impl fmt::Debug for ChangeLogReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeLogReader")
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Paginated iterator over a change log
///
/// Stops after the first error.
pub struct ChangeIter {
    reader: ChangeLogReader,
    table_id: TableId,
    offset: usize,
    buffer: VecDeque<ChangeRecord>,
    done: bool,
}

impl Iterator for ChangeIter {
    type Item = Result<ChangeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            let page_size = self.reader.page_size;
            match self.reader.page(&self.table_id, page_size, self.offset) {
                Ok(page) => {
                    self.done = page.len() < page_size;
                    self.offset += page.len();
                    self.buffer.extend(page);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
