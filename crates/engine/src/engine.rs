//! Engine: wires resolver, change log, registry, and router
//!
//! ```text
//! ChangeLogReader ──records──> TableTypeRegistry ──strategy──> IndexConnectionRouter
//!                                                                   │
//!                                                             IndexEndpoint
//! ```
//!
//! `apply_pending_changes` reads everything after the index's highest
//! applied change and replays it through the table type's strategy. The
//! first failure stops the run; changes applied before it stay applied, so
//! a retry resumes where the failed run stopped.

use std::collections::BTreeSet;
use std::sync::Arc;

use tabula_core::{
    ChangeNumber, ChangeStore, ContainerId, HierarchyLookup, IndexEndpoint, Result, TableId, TableType,
    ViewId, ViewScopeStore,
};
use tracing::info;

use crate::cancel::CancellationToken;
use crate::change_log::ChangeLogReader;
use crate::config::TabulaConfig;
use crate::registry::{ApplyOutcome, TableTypeRegistry};
use crate::router::IndexConnectionRouter;
use crate::scope::ScopeResolver;

/// Counts from one `apply_pending_changes` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Changes written to the index
    pub applied: usize,
    /// Changes the index already held
    pub skipped: usize,
    /// Highest change number seen in this run
    pub last_change: Option<ChangeNumber>,
}

/// Table maintenance engine
#[derive(Debug)]
pub struct Engine {
    resolver: ScopeResolver,
    reader: ChangeLogReader,
    registry: TableTypeRegistry,
    router: Arc<IndexConnectionRouter>,
}

impl Engine {
    /// Build an engine from `config` and the external stores
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the config is invalid or `endpoints` is empty.
    pub fn new(
        config: &TabulaConfig,
        hierarchy: Arc<dyn HierarchyLookup>,
        scopes: Arc<dyn ViewScopeStore>,
        changes: Arc<dyn ChangeStore>,
        endpoints: Vec<Arc<dyn IndexEndpoint>>,
    ) -> Result<Self> {
        config.validate()?;
        let limits = config.limits();
        let excluded = config.unsupported_types()?;

        let router = Arc::new(IndexConnectionRouter::new(endpoints)?);
        let registry = TableTypeRegistry::with_defaults(Arc::clone(&router), &excluded)?;
        let resolver = ScopeResolver::new(hierarchy, scopes).with_limits(limits);
        let reader = ChangeLogReader::new(changes).with_page_size(limits.change_page_size);

        info!(
            endpoints = router.endpoint_count(),
            max_containers_per_view = limits.max_containers_per_view,
            change_page_size = limits.change_page_size,
            "Engine ready"
        );
        Ok(Self {
            resolver,
            reader,
            registry,
            router,
        })
    }

    /// Scope resolver
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Change log reader
    pub fn reader(&self) -> &ChangeLogReader {
        &self.reader
    }

    /// Table type registry
    pub fn registry(&self) -> &TableTypeRegistry {
        &self.registry
    }

    /// Index connection router
    pub fn router(&self) -> &Arc<IndexConnectionRouter> {
        &self.router
    }

    /// Full scope closure of `view_id`
    pub fn resolve_closure(&self, view_id: ViewId) -> Result<BTreeSet<ContainerId>> {
        self.resolver.resolve_closure(view_id)
    }

    /// Full scope closure of `view_id`, aborting when `cancel` fires
    pub fn resolve_closure_with_cancel(
        &self,
        view_id: ViewId,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<ContainerId>> {
        self.resolver.resolve_closure_with_cancel(view_id, cancel)
    }

    /// Replay every change the index of `table_id` has not applied yet
    ///
    /// Running it again without new changes applies nothing.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `table_type` does not accept updates
    /// - `Corruption` if the pending part of the log has a gap
    /// - any error of the strategy, after earlier changes were applied
    pub fn apply_pending_changes(&self, table_id: &TableId, table_type: TableType) -> Result<ApplySummary> {
        let strategy = self.registry.strategy(table_type)?;
        let connection = self.router.connect(Some(table_id))?;
        let after = connection.max_applied_change()?;

        let mut summary = ApplySummary::default();
        for record in self.reader.changes_after(table_id, after)? {
            match strategy.apply(table_id, &record)? {
                ApplyOutcome::Applied => summary.applied += 1,
                ApplyOutcome::AlreadyApplied => summary.skipped += 1,
            }
            summary.last_change = Some(record.change_number());
        }

        info!(
            table_id = %table_id,
            table_type = %table_type,
            strategy = strategy.name(),
            applied = summary.applied,
            skipped = summary.skipped,
            "Applied pending changes"
        );
        Ok(summary)
    }
}
