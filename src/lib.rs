//! Concurrent Invocation Test Harness
//!
//! A thread-safety test harness: take an operation, run it simultaneously
//! across N worker threads with a synchronized start, collect every worker's
//! failure without letting one mask another, and tear the worker pool down
//! within a bounded grace period no matter how the run went.
//!
//! # Features
//!
//! - **Synchronized start**: workers park on a one-shot [`StartBarrier`]
//!   until every one of them has been scheduled, then all are released at
//!   (approximately) the same instant. An unsynchronized start would let
//!   workers run one after another and mask the very races the harness
//!   exists to provoke.
//! - **No failure masking**: every worker's outcome is collected; a failed
//!   run raises exactly one [`UmbrellaFailure`] carrying each individual
//!   failure in completion order, so you can see which and how many workers
//!   diverged.
//! - **Assertion pass-through**: a panic raised by the operation (an
//!   `assert!` firing) is propagated with its original message, never
//!   re-wrapped. Operational problems (the operation could not be invoked
//!   at all) are prefixed with "Cannot test thread safety: " so the two are
//!   impossible to confuse.
//! - **Bounded teardown**: shutdown always interrupts the pool and waits at
//!   most a grace period. A worker that refuses to die is reported as a
//!   possible resource leak, not as a test failure, and never hangs the
//!   test run.
//! - **Cooperative interruption**: each worker thread carries a sticky
//!   [`InterruptToken`]; long-running operations can poll
//!   [`InterruptToken::current`] to exit promptly when the harness tears
//!   down.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use stampede::{op_fn, Stampede};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//!
//! let verdict = Stampede::new(op_fn(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! }))
//! .worker_count(4)
//! .run()?;
//!
//! verdict.assert_success();
//! assert_eq!(hits.load(Ordering::SeqCst), 4);
//! # Ok::<(), stampede::StampedeError>(())
//! ```
//!
//! # Catching a Race
//!
//! The idea: write an operation that calls code which may not be thread
//! safe and assert what a single-threaded caller would expect. Run it under
//! the harness; if one worker's assertion fires while the others pass, the
//! code under test is likely not thread safe.
//!
//! Imagine a lazily assigned ID with a check-then-act gap:
//!
//! ```no_run
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use parking_lot::Mutex;
//! use stampede::{op_fn, Stampede};
//!
//! struct LazyId {
//!     slot: Mutex<Option<u64>>,
//!     next: AtomicU64,
//! }
//!
//! impl LazyId {
//!     fn get(&self) -> u64 {
//!         if self.slot.lock().is_none() {
//!             let id = self.next.fetch_add(1, Ordering::SeqCst);
//!             // Another thread may have assigned in the meantime; this
//!             // overwrites its ID.
//!             *self.slot.lock() = Some(id);
//!         }
//!         self.slot.lock().unwrap()
//!     }
//! }
//!
//! let lazy = std::sync::Arc::new(LazyId {
//!     slot: Mutex::new(None),
//!     next: AtomicU64::new(0),
//! });
//!
//! let under_test = std::sync::Arc::clone(&lazy);
//! let verdict = Stampede::new(op_fn(move || {
//!     let first = under_test.get();
//!     std::thread::sleep(std::time::Duration::from_millis(20));
//!     let second = under_test.get();
//!     assert_eq!(first, second, "observed ID changed after it was assigned");
//!     Ok(())
//! }))
//! .worker_count(20)
//! .run()
//! .unwrap();
//!
//! // With 20 workers the overwrite is all but guaranteed; the verdict
//! // attaches each failing worker's assertion message verbatim.
//! assert!(!verdict.is_success());
//! ```
//!
//! Making `get` take one lock for the whole check-then-act makes the run
//! pass.
//!
//! # Operations
//!
//! An [`Operation`] is invoked with no explicit inputs: resolve the target
//! and arguments first, typically by capturing them in an [`op_fn`]
//! closure. Signal an assertion failure by panicking; signal an operational
//! problem, the kind of thing that means "the harness could not even test
//! you", by returning an [`InvokeError`] with the fitting
//! [`InvocationErrorKind`]. Adapters that invoke targets indirectly can use
//! the `NotAccessible`/`BadArguments`/`InitFailed` kinds; plain closures
//! usually only produce `RaisedException` or `Interrupted`.
//!
//! Any single diverging worker fails the whole run. There is no retry and
//! no averaging: the goal is to detect *any* divergence in concurrent
//! behavior, not to smooth it out.
//!
//! # Global State
//!
//! The harness stresses exactly the shared state the operation touches and
//! serializes none of it. Process-wide state (environment variables, global
//! registries, current-directory) is inherently unsafe to mutate under
//! parallel test execution; do not combine the harness with helpers that
//! snapshot and restore such state across concurrently running test cases.
//!
//! # Optional Tracing Support
//!
//! Observability goes through the `tracing` crate and is feature-gated with
//! **zero overhead when disabled**. The `tracing` feature is enabled by
//! default because the possible-resource-leak warning emitted when forced
//! shutdown times out is part of the harness contract; opt out with
//! `default-features = false`.
//!
//! - **INFO**: run start and completion
//! - **DEBUG**: pool spawning, shutdown bookkeeping
//! - **TRACE**: per-worker-thread detail
//! - **WARN**: possible resource leak on shutdown timeout
//! - **ERROR**: failed verdicts
//!
//! Control the level with `RUST_LOG` through `tracing-subscriber`'s env
//! filter, e.g. `RUST_LOG=stampede=debug`.

// Module declarations
mod aggregate;
mod barrier;
mod error;
mod executor;
mod harness;
mod interrupt;
mod operation;
mod outcome;
mod signal;

// Public re-exports
pub use aggregate::FailureAggregator;
pub use barrier::StartBarrier;
pub use error::{StampedeError, StampedeResult};
pub use executor::{BoundedExecutor, Completion, SequencedNameFactory, ThreadNameFactory};
pub use harness::{
    assert_thread_safe, assert_thread_safe_with, Stampede, DEFAULT_SHUTDOWN_GRACE,
    DEFAULT_WORKER_COUNT,
};
pub use interrupt::InterruptToken;
pub use operation::{op_fn, InvokeError, OpFn, Operation};
pub use outcome::{
    AttachedFailure, InvocationErrorKind, RunVerdict, UmbrellaFailure, WorkerOutcome,
    UMBRELLA_MESSAGE,
};
pub use signal::WaitableSignal;
