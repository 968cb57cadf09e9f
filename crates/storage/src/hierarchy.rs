//! HierarchyStore: in-memory container containment
//!
//! Maps each container to the set of its direct child containers. Used by
//! tests and embedded deployments in place of the platform's node store.
//!
//! Every lookup is counted, and individual containers can be marked as
//! failing, so callers can verify traversal cost and fail-fast behavior.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use tabula_core::{ContainerId, Error, HierarchyLookup, Result};

/// In-memory container hierarchy
#[derive(Debug, Default)]
pub struct HierarchyStore {
    /// parent -> direct child containers
    children: RwLock<HashMap<ContainerId, BTreeSet<ContainerId>>>,
    /// Containers whose lookup fails
    failing: RwLock<HashSet<ContainerId>>,
    /// Number of lookups served (including failed ones)
    lookups: AtomicU64,
}

impl HierarchyStore {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from `(parent, child)` edges
    pub fn from_edges(edges: impl IntoIterator<Item = (u64, u64)>) -> Self {
        let store = Self::new();
        for (parent, child) in edges {
            store.add_child(ContainerId::new(parent), ContainerId::new(child));
        }
        store
    }

    /// Place `child` directly under `parent`
    pub fn add_child(&self, parent: ContainerId, child: ContainerId) {
        self.children.write().entry(parent).or_default().insert(child);
    }

    /// Detach `child` from `parent`
    ///
    /// Returns true if the edge existed.
    pub fn remove_child(&self, parent: ContainerId, child: ContainerId) -> bool {
        let mut children = self.children.write();
        match children.get_mut(&parent) {
            Some(set) => {
                let removed = set.remove(&child);
                if set.is_empty() {
                    children.remove(&parent);
                }
                removed
            }
            None => false,
        }
    }

    /// Make every lookup of `container_id` fail with an I/O error
    pub fn inject_failure(&self, container_id: ContainerId) {
        self.failing.write().insert(container_id);
    }

    /// Clear all injected failures
    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl HierarchyLookup for HierarchyStore {
    fn direct_child_container_ids(&self, container_id: ContainerId) -> Result<BTreeSet<ContainerId>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if self.failing.read().contains(&container_id) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("hierarchy lookup failed for container {}", container_id),
            )));
        }
        Ok(self
            .children
            .read()
            .get(&container_id)
            .cloned()
            .unwrap_or_default())
    }
}
