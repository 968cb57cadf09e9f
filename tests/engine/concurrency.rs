//! Concurrent use of one engine

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_resolutions_agree() {
    let t = Arc::new(TestEngine::new());
    let edges: Vec<(u64, u64)> = (1..200).map(|i| (i / 3, i)).collect();
    t.edges(&edges);
    t.declare(1, &[0]);
    let expected = t.engine.resolve_closure(ViewId::new(1)).unwrap();
    assert_eq!(expected.len(), 200);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let t = Arc::clone(&t);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                t.engine.resolve_closure(ViewId::new(1)).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn appends_during_reads_never_expose_gaps() {
    let t = Arc::new(TestEngine::new());
    let table = TableId::new(5);
    let writer = {
        let t = Arc::clone(&t);
        thread::spawn(move || {
            for i in 0..200 {
                t.append(&table, search(i % 2 == 0));
            }
        })
    };

    for _ in 0..50 {
        let records = t.engine.reader().changes_after(&table, None).unwrap();
        for (expected, record) in records.iter().enumerate() {
            assert_eq!(record.change_number().as_u64(), expected as u64);
        }
    }
    writer.join().unwrap();
    assert_eq!(t.engine.reader().count(&table).unwrap(), 200);
}

#[test]
fn parallel_maintenance_of_distinct_tables() {
    let t = Arc::new(TestEngine::with_config(TabulaConfig::default(), 2));
    for id in 0..8 {
        let table = TableId::new(id);
        for c in 0..10 {
            t.append(&table, add_column(c));
        }
    }

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                t.engine
                    .apply_pending_changes(&TableId::new(id), TableType::Table)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().applied, 10);
    }
    for id in 0..8 {
        let table = TableId::new(id);
        assert_eq!(
            t.index_for(&table).table(&table).unwrap().max_applied,
            Some(ChangeNumber::new(9))
        );
    }
}
