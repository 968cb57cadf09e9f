//! IndexConnectionRouter: table id -> index endpoint
//!
//! Routing is a pure function of the numeric table id (`id % endpoints`),
//! so every version of a table lands on the same endpoint and the mapping
//! is stable for a fixed endpoint list. Connections are cheap handles and
//! are not pooled.

use std::fmt;
use std::sync::Arc;

use tabula_core::{ChangeNumber, Error, IndexEndpoint, Result, TableChange, TableId};
use tracing::debug;

/// Handle to the index endpoint serving one table
///
/// The default connection (see [`IndexConnectionRouter::connect_default`])
/// is not bound to a table; table operations on it fail with
/// `InvalidArgument`.
#[derive(Clone)]
pub struct IndexConnection {
    endpoint: Arc<dyn IndexEndpoint>,
    table_id: Option<TableId>,
}

impl IndexConnection {
    /// Table this connection is bound to
    pub fn table_id(&self) -> Option<&TableId> {
        self.table_id.as_ref()
    }

    /// Name of the backing endpoint
    pub fn endpoint_name(&self) -> &str {
        self.endpoint.name()
    }

    /// Whether `other` talks to the same endpoint instance
    pub fn same_endpoint(&self, other: &IndexConnection) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.endpoint) as *const (),
            Arc::as_ptr(&other.endpoint) as *const (),
        )
    }

    fn bound_table(&self) -> Result<&TableId> {
        self.table_id.as_ref().ok_or_else(|| {
            Error::invalid_argument(format!(
                "connection to {} is not bound to a table",
                self.endpoint.name()
            ))
        })
    }

    /// Apply `change` to the bound table's index
    pub fn apply_change(&self, change_number: ChangeNumber, change: &TableChange) -> Result<()> {
        let table_id = self.bound_table()?;
        self.endpoint.apply_change(table_id, change_number, change)
    }

    /// Highest change applied to the bound table's index
    pub fn max_applied_change(&self) -> Result<Option<ChangeNumber>> {
        let table_id = self.bound_table()?;
        self.endpoint.max_applied_change(table_id)
    }

    /// Drop the bound table's index
    pub fn delete_index(&self) -> Result<()> {
        let table_id = self.bound_table()?;
        self.endpoint.delete_index(table_id)
    }
}

impl fmt::Debug for IndexConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConnection")
            .field("endpoint", &self.endpoint.name())
            .field("table_id", &self.table_id)
            .finish()
    }
}

/// Routes tables to a fixed list of index endpoints
pub struct IndexConnectionRouter {
    endpoints: Vec<Arc<dyn IndexEndpoint>>,
}

impl IndexConnectionRouter {
    /// Create a router over `endpoints`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `endpoints` is empty.
    pub fn new(endpoints: Vec<Arc<dyn IndexEndpoint>>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::configuration("at least one index endpoint is required"));
        }
        Ok(Self { endpoints })
    }

    /// Number of endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Connection for `table_id`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `table_id` is None.
    pub fn connect(&self, table_id: Option<&TableId>) -> Result<IndexConnection> {
        let table_id = table_id.ok_or_else(|| Error::invalid_argument("table id is required"))?;
        let slot = (table_id.id() % self.endpoints.len() as u64) as usize;
        let endpoint = Arc::clone(&self.endpoints[slot]);
        debug!(table_id = %table_id, endpoint = endpoint.name(), "Routed table");
        Ok(IndexConnection {
            endpoint,
            table_id: Some(*table_id),
        })
    }

    /// Connection for a table id given as text (`syn123`, `123.4`, ...)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `raw` is blank or malformed.
    pub fn connect_str(&self, raw: &str) -> Result<IndexConnection> {
        if raw.trim().is_empty() {
            return Err(Error::invalid_argument("table id is required"));
        }
        let table_id = TableId::parse(raw)?;
        self.connect(Some(&table_id))
    }

    /// Connection to the first endpoint, not bound to any table
    pub fn connect_default(&self) -> IndexConnection {
        IndexConnection {
            endpoint: Arc::clone(&self.endpoints[0]),
            table_id: None,
        }
    }
}

impl fmt::Debug for IndexConnectionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.endpoints.iter().map(|e| e.name()).collect();
        f.debug_struct("IndexConnectionRouter")
            .field("endpoints", &names)
            .finish()
    }
}
