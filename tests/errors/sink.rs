//! Tests for translating verdicts into test-framework-visible failures

use std::panic::{catch_unwind, AssertUnwindSafe};

use stampede::{assert_thread_safe_with, op_fn, Stampede, UMBRELLA_MESSAGE};
use stampede_test::{failing_op, panicking_op};

#[test]
fn test_success_verdict_produces_no_visible_failure() {
    Stampede::new(op_fn(|| Ok(())))
        .run()
        .unwrap()
        .assert_success();
}

#[test]
fn test_failed_verdict_produces_one_failure_with_all_entries() {
    let verdict = Stampede::new(failing_op("boom"))
        .worker_count(3)
        .run()
        .unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| verdict.assert_success()));
    let payload = outcome.expect_err("a failed verdict must panic");
    let message = payload
        .downcast_ref::<String>()
        .expect("panic carries the umbrella rendering");

    assert!(message.starts_with(UMBRELLA_MESSAGE));
    assert_eq!(
        message.matches("Cannot test thread safety").count(),
        3,
        "every worker's failure is attached: {}",
        message
    );
}

#[test]
#[should_panic(expected = "problems occurred while running concurrently")]
fn test_assert_thread_safe_with_panics_on_divergence() {
    assert_thread_safe_with(panicking_op("diverged"), 4);
}
