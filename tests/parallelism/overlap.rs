//! Tests proving workers really execute the operation in overlap

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stampede::{op_fn, Stampede, WaitableSignal};

#[test]
fn test_all_workers_are_inside_the_operation_at_once() {
    // Rendezvous inside the operation: the signal only reaches zero while
    // all eight workers are simultaneously between entry and exit. A
    // sequential schedule could never pass this.
    const WORKERS: u32 = 8;
    let rendezvous = WaitableSignal::new(WORKERS);

    let signal = rendezvous.clone();
    let verdict = Stampede::new(op_fn(move || {
        signal.arrive();
        assert_eq!(
            signal.wait_for(Duration::from_secs(5)),
            Ok(true),
            "not all workers reached the operation concurrently"
        );
        Ok(())
    }))
    .worker_count(WORKERS as usize)
    .run()
    .unwrap();

    verdict.assert_success();
}

#[test]
fn test_observed_concurrency_exceeds_one() {
    // Track maximum simultaneous invocations with an atomic high-water mark.
    let concurrent = Arc::new(AtomicUsize::new(0));
    let high_water = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&concurrent);
    let max = Arc::clone(&high_water);
    let verdict = Stampede::new(op_fn(move || {
        let current = count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut prev_max = max.load(Ordering::SeqCst);
        while current > prev_max {
            match max.compare_exchange_weak(prev_max, current, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => break,
                Err(x) => prev_max = x,
            }
        }

        thread::sleep(Duration::from_millis(10));
        count.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }))
    .worker_count(8)
    .run()
    .unwrap();

    verdict.assert_success();
    assert!(
        high_water.load(Ordering::SeqCst) > 1,
        "workers never overlapped"
    );
}
