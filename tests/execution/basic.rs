//! Tests for successful runs and invocation counting

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use stampede::{assert_thread_safe, op_fn, Stampede};
use stampede_test::counting_op;
use test_case::test_case;

use crate::common::LONG;

#[test_case(1)]
#[test_case(2)]
#[test_case(4)]
#[test_case(10)]
fn test_always_succeeding_op_passes_and_runs_exactly_n_times(workers: usize) {
    let invocations = Arc::new(AtomicUsize::new(0));

    let verdict = Stampede::new(counting_op(Arc::clone(&invocations)))
        .worker_count(workers)
        .run()
        .unwrap();

    verdict.assert_success();
    assert_eq!(invocations.load(Ordering::SeqCst), workers);
}

#[test]
fn test_unspecified_worker_count_defaults_to_two() {
    let invocations = Arc::new(AtomicUsize::new(0));

    Stampede::new(counting_op(Arc::clone(&invocations)))
        .run()
        .unwrap()
        .assert_success();

    assert_eq!(invocations.load(Ordering::SeqCst), 2);
}

#[test]
fn test_ten_workers_have_ten_distinct_identities() {
    // The rendezvous keeps every invocation inside the operation until all
    // ten are, so no worker thread can pick up a second invocation and the
    // ten recorded identities are necessarily distinct.
    let names = Arc::new(Mutex::new(HashSet::new()));
    let rendezvous = stampede::WaitableSignal::new(10);

    let recorded = Arc::clone(&names);
    let signal = rendezvous.clone();
    Stampede::new(op_fn(move || {
        let name = std::thread::current().name().unwrap_or("").to_string();
        recorded.lock().insert(name);
        signal.arrive();
        assert_eq!(signal.wait_for(LONG), Ok(true));
        Ok(())
    }))
    .worker_count(10)
    .run()
    .unwrap()
    .assert_success();

    let names = names.lock();
    assert_eq!(names.len(), 10, "each invocation ran on its own worker");
    assert!(names.iter().all(|name| name.starts_with("stampede-worker-")));
}

#[test]
fn test_assert_thread_safe_passes_silently_for_safe_code() {
    let counter = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&counter);
    assert_thread_safe(op_fn(move || {
        hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}
