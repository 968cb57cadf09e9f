//! ScopeResolver: transitive closure of a view's scope
//!
//! ## Algorithm
//!
//! Breadth-first walk over container containment with an explicit queue
//! and a visited set:
//!
//! 1. Seed the closure and the queue with the declared containers.
//! 2. Pop a container, ask the hierarchy for its direct child containers.
//! 3. Queue every child not already in the closure.
//!
//! Each container is looked up exactly once, so duplicated or cyclic
//! edges terminate. No recursion, so depth is bounded only by memory.
//!
//! ## Failure
//!
//! Any lookup failure aborts the whole resolution with `ResolutionFailure`;
//! a partial closure is never returned. Cancellation is checked before each
//! lookup and is reported the same way.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use tabula_core::{
    ContainerId, Error, HierarchyLookup, Limits, Result, ScopeType, ViewId, ViewScope, ViewScopeStore,
};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;

/// Computes scope closures over an external hierarchy
///
/// Stateless apart from its collaborators; concurrent calls are independent.
#[derive(Clone)]
pub struct ScopeResolver {
    hierarchy: Arc<dyn HierarchyLookup>,
    scopes: Arc<dyn ViewScopeStore>,
    limits: Limits,
}

impl ScopeResolver {
    /// Create a resolver with default limits
    pub fn new(hierarchy: Arc<dyn HierarchyLookup>, scopes: Arc<dyn ViewScopeStore>) -> Self {
        Self {
            hierarchy,
            scopes,
            limits: Limits::default(),
        }
    }

    /// Replace the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits in effect
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Full scope closure of `view_id`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the view has no declared scope (or an empty one)
    /// - `ResolutionFailure` if any hierarchy lookup fails
    /// - `LimitExceeded` if the closure exceeds `max_containers_per_view`
    pub fn resolve_closure(&self, view_id: ViewId) -> Result<BTreeSet<ContainerId>> {
        self.resolve_closure_with_cancel(view_id, &CancellationToken::new())
    }

    /// Like [`resolve_closure`](Self::resolve_closure), aborting when `cancel` fires
    ///
    /// Cancellation yields `ResolutionFailure` wrapping `Cancelled`.
    pub fn resolve_closure_with_cancel(
        &self,
        view_id: ViewId,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<ContainerId>> {
        let scope = self
            .scopes
            .scope(view_id)?
            .ok_or_else(|| Error::not_found(format!("view {} has no declared scope", view_id)))?;
        self.resolve_scope(view_id, &scope, cancel)
    }

    /// Closure of an already fetched `scope` belonging to `view_id`
    pub fn resolve_scope(
        &self,
        view_id: ViewId,
        scope: &ViewScope,
        cancel: &CancellationToken,
    ) -> Result<BTreeSet<ContainerId>> {
        if scope.is_empty() {
            return Err(Error::not_found(format!("view {} has an empty scope", view_id)));
        }
        self.check_limit(view_id, scope.len())?;

        if scope.scope_type == ScopeType::ProjectsOnly {
            debug!(view_id = %view_id, size = scope.len(), "Projects-only scope, no traversal");
            return Ok(scope.container_ids.clone());
        }

        let mut closure = scope.container_ids.clone();
        let mut frontier: VecDeque<ContainerId> = closure.iter().copied().collect();
        let mut lookups = 0u64;

        while let Some(container) = frontier.pop_front() {
            cancel
                .check()
                .map_err(|e| Error::resolution_failure(view_id, e))?;
            let children = self
                .hierarchy
                .direct_child_container_ids(container)
                .map_err(|e| Error::resolution_failure(view_id, e))?;
            lookups += 1;

            for child in children {
                if closure.insert(child) {
                    frontier.push_back(child);
                }
            }
            self.check_limit(view_id, closure.len())?;
        }

        debug!(
            view_id = %view_id,
            scope_size = scope.len(),
            closure_size = closure.len(),
            lookups,
            "Resolved scope closure"
        );
        Ok(closure)
    }

    fn check_limit(&self, view_id: ViewId, count: usize) -> Result<()> {
        self.limits.check_container_count(count).map_err(|_| {
            warn!(
                view_id = %view_id,
                limit = self.limits.max_containers_per_view,
                "Scope closure over container limit"
            );
            Error::LimitExceeded(format!(
                "scope of view {} contains more than {} containers",
                view_id, self.limits.max_containers_per_view
            ))
        })
    }
}

impl fmt::Debug for ScopeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeResolver")
            .field("limits", &self.limits)
            .finish()
    }
}
