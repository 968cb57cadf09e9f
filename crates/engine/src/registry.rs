//! Table type registry for per-type maintenance
//!
//! Every [`TableType`] is either bound to a [`MaintenanceStrategy`] or
//! explicitly excluded. The builder refuses to produce a registry that
//! leaves a type unaccounted for, so lookups never hit an unknown slot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = TableTypeRegistry::builder()
//!     .bind(TableType::Table, Arc::new(TableEntityStrategy::new(router.clone())))
//!     .bind(TableType::EntityView, view_strategy.clone())
//!     // ...
//!     .exclude(TableType::MaterializedView)
//!     .build()?;
//!
//! let strategy = registry.strategy(TableType::Table)?;
//! strategy.apply(&table_id, &record)?;
//! ```

use std::fmt;
use std::sync::Arc;

use tabula_core::{Error, Result, TableId, TableType};
use tracing::info;

use crate::change_log::ChangeRecord;
use crate::router::IndexConnectionRouter;
use crate::strategy::{TableEntityStrategy, ViewStrategy};

/// Result of applying one change to an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The change was written to the index
    Applied,
    /// The index had already applied this change (or a later one)
    AlreadyApplied,
}

/// Per-table-type maintenance behavior
///
/// Implementations must be safe to call concurrently for different tables.
pub trait MaintenanceStrategy: Send + Sync {
    /// Strategy name (logs, diagnostics)
    fn name(&self) -> &'static str;

    /// Apply `record` to the index of `table_id`
    ///
    /// Replaying a change the index already holds returns `AlreadyApplied`.
    fn apply(&self, table_id: &TableId, record: &ChangeRecord) -> Result<ApplyOutcome>;
}

#[derive(Clone)]
enum Slot {
    Empty,
    Bound(Arc<dyn MaintenanceStrategy>),
    Excluded,
}

/// Builder for [`TableTypeRegistry`]
pub struct RegistryBuilder {
    slots: Vec<Slot>,
    conflicts: Vec<String>,
}

impl RegistryBuilder {
    fn new() -> Self {
        Self {
            slots: vec![Slot::Empty; TableType::COUNT],
            conflicts: Vec::new(),
        }
    }

    /// Bind `strategy` to `table_type`
    pub fn bind(mut self, table_type: TableType, strategy: Arc<dyn MaintenanceStrategy>) -> Self {
        let slot = &mut self.slots[table_type.ordinal()];
        match slot {
            Slot::Empty => *slot = Slot::Bound(strategy),
            Slot::Bound(_) => self
                .conflicts
                .push(format!("table type {} is bound more than once", table_type)),
            Slot::Excluded => self
                .conflicts
                .push(format!("table type {} is both bound and excluded", table_type)),
        }
        self
    }

    /// Mark `table_type` as not supporting updates
    pub fn exclude(mut self, table_type: TableType) -> Self {
        let slot = &mut self.slots[table_type.ordinal()];
        match slot {
            Slot::Empty | Slot::Excluded => *slot = Slot::Excluded,
            Slot::Bound(_) => self
                .conflicts
                .push(format!("table type {} is both bound and excluded", table_type)),
        }
        self
    }

    /// Exclude every type in `table_types`
    pub fn exclude_all(self, table_types: impl IntoIterator<Item = TableType>) -> Self {
        table_types.into_iter().fold(self, |builder, t| builder.exclude(t))
    }

    /// Finish the registry
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a type is neither bound nor excluded, or if
    /// a type was bound twice or both bound and excluded.
    pub fn build(self) -> Result<TableTypeRegistry> {
        if !self.conflicts.is_empty() {
            return Err(Error::configuration(self.conflicts.join("; ")));
        }

        let missing: Vec<&'static str> = TableType::ALL
            .iter()
            .filter(|t| matches!(self.slots[t.ordinal()], Slot::Empty))
            .map(|t| t.id())
            .collect();
        if !missing.is_empty() {
            return Err(Error::configuration(format!(
                "no maintenance strategy bound for table types: {}",
                missing.join(", ")
            )));
        }

        let mut strategies: [Option<Arc<dyn MaintenanceStrategy>>; TableType::COUNT] = Default::default();
        for (entry, slot) in strategies.iter_mut().zip(self.slots) {
            if let Slot::Bound(strategy) = slot {
                *entry = Some(strategy);
            }
        }
        let registry = TableTypeRegistry { strategies };

        info!(
            bound = ?registry.bound_types(),
            excluded = ?registry.excluded(),
            "Built table type registry"
        );
        Ok(registry)
    }
}

/// Immutable map from table type to maintenance strategy
///
/// `None` slots are excluded types; every other type has a strategy.
pub struct TableTypeRegistry {
    strategies: [Option<Arc<dyn MaintenanceStrategy>>; TableType::COUNT],
}

impl TableTypeRegistry {
    /// Start a new builder
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with the built-in strategies
    ///
    /// `Table` gets a [`TableEntityStrategy`]; every other type shares one
    /// [`ViewStrategy`]. Types in `excluded` are left unsupported.
    pub fn with_defaults(router: Arc<IndexConnectionRouter>, excluded: &[TableType]) -> Result<Self> {
        let entity: Arc<dyn MaintenanceStrategy> = Arc::new(TableEntityStrategy::new(Arc::clone(&router)));
        let view: Arc<dyn MaintenanceStrategy> = Arc::new(ViewStrategy::new(router));

        let mut builder = Self::builder();
        for table_type in TableType::ALL {
            if excluded.contains(&table_type) {
                builder = builder.exclude(table_type);
            } else if table_type == TableType::Table {
                builder = builder.bind(table_type, Arc::clone(&entity));
            } else {
                builder = builder.bind(table_type, Arc::clone(&view));
            }
        }
        builder.build()
    }

    /// Strategy for `table_type`
    ///
    /// Returns the same instance on every call.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the type is excluded.
    pub fn strategy(&self, table_type: TableType) -> Result<&Arc<dyn MaintenanceStrategy>> {
        self.strategies[table_type.ordinal()]
            .as_ref()
            .ok_or_else(|| Error::not_found(format!("updates not supported for table type {}", table_type)))
    }

    /// Whether `table_type` has a strategy
    pub fn is_supported(&self, table_type: TableType) -> bool {
        self.strategies[table_type.ordinal()].is_some()
    }

    /// Excluded types, in `TableType::ALL` order
    pub fn excluded(&self) -> Vec<TableType> {
        TableType::ALL
            .iter()
            .copied()
            .filter(|t| !self.is_supported(*t))
            .collect()
    }

    /// Bound types, in `TableType::ALL` order
    pub fn bound_types(&self) -> Vec<TableType> {
        TableType::ALL
            .iter()
            .copied()
            .filter(|t| self.is_supported(*t))
            .collect()
    }
}

impl fmt::Debug for TableTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<(TableType, &'static str)> = TableType::ALL
            .iter()
            .filter_map(|t| self.strategies[t.ordinal()].as_ref().map(|s| (*t, s.name())))
            .collect();
        f.debug_struct("TableTypeRegistry")
            .field("bound", &bound)
            .field("excluded", &self.excluded())
            .finish()
    }
}
