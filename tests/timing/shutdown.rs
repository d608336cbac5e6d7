//! Tests for forced shutdown bounds and interruption flow

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use stampede::{InterruptToken, Stampede};
use stampede_test::{interruptible_op, neverending_op};

const COLLECT: Duration = Duration::from_millis(100);
const GRACE: Duration = Duration::from_millis(200);

#[test]
fn test_interruptible_workers_exit_with_interrupted_outcomes() {
    const WORKERS: usize = 4;
    let (op, _started) = interruptible_op(WORKERS as u32);

    let begin = Instant::now();
    let verdict = Stampede::new(op)
        .worker_count(WORKERS)
        .completion_timeout(COLLECT)
        .shutdown_grace(GRACE)
        .run()
        .unwrap();
    let elapsed = begin.elapsed();

    let failure = verdict.failure().expect("no worker finished in time");
    assert_eq!(failure.attached().len(), WORKERS);
    for attached in failure.attached() {
        assert!(
            attached.message().contains("was interrupted"),
            "unexpected outcome: {}",
            attached
        );
    }
    assert!(
        elapsed < Duration::from_secs(5),
        "run took {:?} despite bounded collection and grace",
        elapsed
    );
}

#[test]
fn test_uninterruptible_workers_do_not_hang_the_run() {
    const WORKERS: usize = 2;
    let stop = Arc::new(AtomicBool::new(false));
    let (op, started) = neverending_op(WORKERS as u32, Arc::clone(&stop));

    let begin = Instant::now();
    let verdict = Stampede::new(op)
        .worker_count(WORKERS)
        .completion_timeout(COLLECT)
        .shutdown_grace(GRACE)
        .run()
        .unwrap();
    let elapsed = begin.elapsed();

    // Both workers were running, neither could be collected or shut down;
    // each is accounted for as interrupted.
    assert_eq!(started.remaining(), 0, "both workers must have started");
    let failure = verdict.failure().expect("leaked workers fail the run");
    assert_eq!(failure.attached().len(), WORKERS);
    assert!(failure
        .attached()
        .iter()
        .all(|f| f.message().contains("was interrupted")));

    // Hard bound: collection timeout + grace period + scheduling slack.
    assert!(
        elapsed < COLLECT + GRACE + Duration::from_secs(2),
        "run took {:?}, beyond the bounded teardown window",
        elapsed
    );

    stop.store(true, Ordering::SeqCst);
}

#[test]
fn test_external_interrupt_of_the_controlling_thread_tears_down_promptly() {
    const WORKERS: usize = 4;
    let (op, _started) = interruptible_op(WORKERS as u32);

    // Simulate the surrounding test run being torn down: the controlling
    // thread's interrupt flag is already tripped when collection starts.
    let token = InterruptToken::current();
    token.interrupt();

    let begin = Instant::now();
    let verdict = Stampede::new(op)
        .worker_count(WORKERS)
        .shutdown_grace(GRACE)
        .run()
        .unwrap();
    let elapsed = begin.elapsed();

    token.clear();

    let failure = verdict.failure().expect("run was interrupted");
    assert_eq!(failure.attached().len(), WORKERS);
    assert!(failure
        .attached()
        .iter()
        .all(|f| f.message().contains("was interrupted")));
    assert!(
        elapsed < Duration::from_secs(5),
        "interrupted run took {:?}",
        elapsed
    );
}
