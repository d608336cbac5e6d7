//! Tests for reusing a retained executor across runs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stampede::{BoundedExecutor, SequencedNameFactory, Stampede};
use stampede_test::counting_op;

use crate::common::{GRACE, LONG};

#[test]
fn test_clean_runs_leave_a_retained_executor_usable() {
    let executor = BoundedExecutor::new(4, SequencedNameFactory::new("retained")).unwrap();
    let invocations = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        Stampede::new(counting_op(Arc::clone(&invocations)))
            .worker_count(4)
            .run_on(&executor)
            .unwrap()
            .assert_success();
    }
    assert_eq!(invocations.load(Ordering::SeqCst), 12);

    // The pool survived all three runs and still accepts plain work.
    let completion = executor.submit(|| {}).unwrap();
    completion.assert_reached(LONG).unwrap();
    assert!(executor.force_shutdown(GRACE));
}

#[test]
fn test_smaller_run_fits_on_larger_retained_executor() {
    let executor = BoundedExecutor::new(8, SequencedNameFactory::new("retained")).unwrap();
    let invocations = Arc::new(AtomicUsize::new(0));

    Stampede::new(counting_op(Arc::clone(&invocations)))
        .worker_count(3)
        .run_on(&executor)
        .unwrap()
        .assert_success();

    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert!(executor.force_shutdown(GRACE));
}
