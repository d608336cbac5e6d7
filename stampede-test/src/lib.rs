//! Canned operations for internal use in stampede's tests and benchmarks.
//!
//! This crate is not meant for public use and offers no stability guarantees.
//! Each helper returns an [`Operation`] with a known, deliberately extreme
//! behavior: spinning until interrupted, refusing to die, failing on every
//! invocation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use stampede::{op_fn, InterruptToken, InvokeError, Operation, WaitableSignal};

/// An operation that runs until the invoking worker is interrupted, then
/// reports `Interrupted`.
///
/// The returned signal is reached once `workers` invocations have started,
/// so callers can wait until the operation is actually running before
/// interrupting it.
pub fn interruptible_op(workers: u32) -> (impl Operation, WaitableSignal) {
    let started = WaitableSignal::new(workers);
    let started_signal = started.clone();
    let op = op_fn(move || {
        let token = InterruptToken::current();
        started_signal.arrive();
        while !token.is_interrupted() {
            thread::yield_now();
        }
        Err(InvokeError::interrupted())
    });
    (op, started)
}

/// An operation that ignores interruption and runs until the external
/// `stop` flag flips.
///
/// Forces `force_shutdown` to time out. Callers must flip the flag once
/// they are done measuring, or the worker threads keep spinning.
pub fn neverending_op(workers: u32, stop: Arc<AtomicBool>) -> (impl Operation, WaitableSignal) {
    let started = WaitableSignal::new(workers);
    let started_signal = started.clone();
    let op = op_fn(move || {
        started_signal.arrive();
        while !stop.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        Ok(())
    });
    (op, started)
}

/// An operation that always fails with `RaisedException` and the given
/// message as cause.
pub fn failing_op(message: impl Into<String>) -> impl Operation {
    let message = message.into();
    op_fn(move || Err(InvokeError::raised(message.clone())))
}

/// An operation that always panics with the given message, i.e. signals an
/// assertion failure.
pub fn panicking_op(message: impl Into<String>) -> impl Operation {
    let message = message.into();
    op_fn(move || -> Result<(), InvokeError> { panic!("{}", message) })
}

/// An operation whose target is never accessible.
pub fn not_accessible_op() -> impl Operation {
    op_fn(|| Err(InvokeError::not_accessible("target is private")))
}

/// An operation that succeeds and counts its invocations.
pub fn counting_op(counter: Arc<AtomicUsize>) -> impl Operation {
    op_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}
