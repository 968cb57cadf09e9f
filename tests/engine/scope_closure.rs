//! Scope closure over generated hierarchies

use crate::common::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tabula::{CancellationToken, Error, HierarchyLookup, ScopeResolver};

/// Reference closure by repeated relaxation over the edge list.
fn reference_closure(edges: &[(u64, u64)], seed: &BTreeSet<u64>) -> BTreeSet<u64> {
    let mut children: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (p, c) in edges {
        children.entry(*p).or_default().push(*c);
    }
    let mut closure = seed.clone();
    loop {
        let before = closure.len();
        let snapshot: Vec<u64> = closure.iter().copied().collect();
        for id in snapshot {
            if let Some(kids) = children.get(&id) {
                closure.extend(kids.iter().copied());
            }
        }
        if closure.len() == before {
            return closure;
        }
    }
}

#[test]
fn two_projects_with_folders() {
    let t = TestEngine::new();
    t.edges(&[(222, 2221), (222, 2222), (2221, 22211), (333, 3331)]);
    t.declare(1, &[222, 333]);
    let closure = t.engine.resolve_closure(ViewId::new(1)).unwrap();
    assert_eq!(closure, ids(&[222, 333, 2221, 2222, 22211, 3331]));
}

#[test]
fn undeclared_view_is_not_found() {
    let t = TestEngine::new();
    let err = t.engine.resolve_closure(ViewId::new(404)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn failing_lookup_names_the_view() {
    let t = TestEngine::new();
    t.edges(&[(1, 2), (2, 3)]);
    t.declare(9, &[1]);
    t.hierarchy.inject_failure(ContainerId::new(3));
    let err = t.engine.resolve_closure(ViewId::new(9)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    assert!(err.to_string().contains("view 9"));

    t.hierarchy.clear_failures();
    assert_eq!(t.engine.resolve_closure(ViewId::new(9)).unwrap(), ids(&[1, 2, 3]));
}

#[test]
fn hierarchy_changes_are_visible_to_next_resolution() {
    let t = TestEngine::new();
    t.edges(&[(1, 2)]);
    t.declare(1, &[1]);
    assert_eq!(t.engine.resolve_closure(ViewId::new(1)).unwrap(), ids(&[1, 2]));

    t.edges(&[(2, 3)]);
    assert_eq!(t.engine.resolve_closure(ViewId::new(1)).unwrap(), ids(&[1, 2, 3]));

    t.hierarchy.remove_child(ContainerId::new(1), ContainerId::new(2));
    assert_eq!(t.engine.resolve_closure(ViewId::new(1)).unwrap(), ids(&[1]));
}

#[test]
fn projects_only_scope_ignores_folders() {
    let t = TestEngine::new();
    t.edges(&[(1, 2), (3, 4)]);
    t.scopes
        .set_scope(ViewId::new(1), ViewScope::projects(ids(&[1, 3])));
    assert_eq!(t.engine.resolve_closure(ViewId::new(1)).unwrap(), ids(&[1, 3]));
    assert_eq!(t.hierarchy.lookup_count(), 0);
}

#[test]
fn configured_limit_applies() {
    let config = TabulaConfig {
        max_containers_per_view: 5,
        ..TabulaConfig::default()
    };
    let t = TestEngine::with_config(config, 1);
    let edges: Vec<(u64, u64)> = (10..20).map(|c| (1, c)).collect();
    t.edges(&edges);
    t.declare(1, &[1]);
    let err = t.engine.resolve_closure(ViewId::new(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}

#[test]
fn cancelled_before_start() {
    let t = TestEngine::new();
    t.edges(&[(1, 2)]);
    t.declare(1, &[1]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = t
        .engine
        .resolve_closure_with_cancel(ViewId::new(1), &cancel)
        .unwrap_err();
    match err {
        Error::ResolutionFailure { source, .. } => assert_eq!(source.kind(), ErrorKind::Cancelled),
        other => panic!("unexpected error {:?}", other),
    }
}

/// Hierarchy whose lookups cancel the token once `budget` lookups are used
struct Budgeted {
    inner: Arc<HierarchyStore>,
    cancel: CancellationToken,
    budget: u64,
}

impl HierarchyLookup for Budgeted {
    fn direct_child_container_ids(&self, container_id: ContainerId) -> tabula::Result<BTreeSet<ContainerId>> {
        let children = self.inner.direct_child_container_ids(container_id)?;
        if self.inner.lookup_count() >= self.budget {
            self.cancel.cancel();
        }
        Ok(children)
    }
}

#[test]
fn cancelled_partway_through() {
    let t = TestEngine::new();
    t.edges(&[(1, 2), (1, 3), (2, 4), (3, 5), (4, 6)]);
    t.declare(1, &[1]);
    let cancel = CancellationToken::new();
    let hierarchy = Arc::new(Budgeted {
        inner: t.hierarchy.clone(),
        cancel: cancel.clone(),
        budget: 3,
    });
    let resolver = ScopeResolver::new(hierarchy, t.scopes.clone());

    let err = resolver
        .resolve_closure_with_cancel(ViewId::new(1), &cancel)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    match err {
        Error::ResolutionFailure { source, .. } => assert_eq!(source.kind(), ErrorKind::Cancelled),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(t.hierarchy.lookup_count(), 3);

    // A fresh token resolves the whole closure
    let closure = resolver
        .resolve_closure_with_cancel(ViewId::new(1), &CancellationToken::new())
        .unwrap();
    assert_eq!(closure, ids(&[1, 2, 3, 4, 5, 6]));
}

fn edges_strategy() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0u64..40, 0u64..40), 0..120)
}

proptest! {
    #[test]
    fn closure_contains_scope_and_matches_reference(
        edges in edges_strategy(),
        seed in prop::collection::btree_set(0u64..40, 1..6),
    ) {
        let t = TestEngine::new();
        t.edges(&edges);
        let seed_vec: Vec<u64> = seed.iter().copied().collect();
        t.declare(1, &seed_vec);

        let closure = t.engine.resolve_closure(ViewId::new(1)).unwrap();
        let declared = ids(&seed_vec);
        prop_assert!(closure.is_superset(&declared));

        let expected: BTreeSet<ContainerId> =
            reference_closure(&edges, &seed).into_iter().map(ContainerId::new).collect();
        prop_assert_eq!(&closure, &expected);
        // One lookup per container in the closure
        prop_assert_eq!(t.hierarchy.lookup_count(), closure.len() as u64);
    }

    #[test]
    fn resolution_is_idempotent(
        edges in edges_strategy(),
        seed in prop::collection::btree_set(0u64..40, 1..6),
    ) {
        let t = TestEngine::new();
        t.edges(&edges);
        let seed_vec: Vec<u64> = seed.into_iter().collect();
        t.declare(1, &seed_vec);

        let first = t.engine.resolve_closure(ViewId::new(1)).unwrap();
        let second = t.engine.resolve_closure(ViewId::new(1)).unwrap();
        prop_assert_eq!(first, second);
    }
}
