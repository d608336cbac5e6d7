//! The concurrent invocation harness.
//!
//! [`Stampede`] runs one [`Operation`] simultaneously across N worker
//! threads with a synchronized start, collects every worker's outcome
//! without letting one failure mask another, and tears the worker pool down
//! within a bounded grace period regardless of the verdict.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, warn};

use crate::aggregate::FailureAggregator;
use crate::barrier::StartBarrier;
use crate::error::{StampedeError, StampedeResult};
use crate::executor::{BoundedExecutor, SequencedNameFactory};
use crate::operation::{InvokeError, Operation};
use crate::outcome::{InvocationErrorKind, RunVerdict, WorkerOutcome};

/// Worker count used when none is configured.
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Grace period granted to the worker pool during forced shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs an operation concurrently and aggregates every worker's outcome into
/// one verdict.
///
/// # Workflow
///
/// 1. Create a harness with [`Stampede::new`]
/// 2. Optionally configure it with [`Stampede::worker_count`] and the
///    timeout setters
/// 3. Execute with [`Stampede::run`] (or [`Stampede::run_on`] to reuse a
///    retained executor)
/// 4. Report through [`RunVerdict::assert_success`] or inspect the verdict
///
/// The more workers, the more likely a race is to manifest, but even the
/// default of two regularly catches unsynchronized lazy initialization.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use stampede::{op_fn, Stampede};
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
///
/// let verdict = Stampede::new(op_fn(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// }))
/// .worker_count(8)
/// .run()?;
///
/// verdict.assert_success();
/// assert_eq!(hits.load(Ordering::SeqCst), 8);
/// # Ok::<(), stampede::StampedeError>(())
/// ```
pub struct Stampede {
    op: Arc<dyn Operation>,
    worker_count: usize,
    start_timeout: Duration,
    completion_timeout: Duration,
    shutdown_grace: Duration,
}

impl Stampede {
    /// Create a harness for `op` with the default worker count of 2.
    pub fn new(op: impl Operation + 'static) -> Self {
        Self {
            op: Arc::new(op),
            worker_count: DEFAULT_WORKER_COUNT,
            start_timeout: DEFAULT_START_TIMEOUT,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Number of worker threads to invoke the operation from.
    ///
    /// Zero is rejected by [`Stampede::run`] with
    /// [`StampedeError::InvalidConfiguration`]; it is never silently
    /// defaulted.
    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    /// How long each worker may wait on the start barrier.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// How long the harness waits for each worker's completion.
    pub fn completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Grace period for forced pool shutdown, independent of the completion
    /// timeout.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run the operation across the configured number of workers on a fresh
    /// executor, which is force-shut-down afterwards regardless of verdict.
    ///
    /// # Errors
    ///
    /// Returns [`StampedeError::InvalidConfiguration`] for a worker count of
    /// zero, before any thread is spawned. Failures of the operation under
    /// test are not errors; they are reported inside the returned
    /// [`RunVerdict`].
    pub fn run(&self) -> StampedeResult<RunVerdict> {
        self.validate()?;
        let executor = BoundedExecutor::new(
            self.worker_count,
            SequencedNameFactory::new("stampede-worker"),
        )?;
        self.execute(&executor, true)
    }

    /// Run on a caller-retained executor instead of a fresh one.
    ///
    /// The executor is left running for reuse when the run completes
    /// cleanly. If collection times out or is interrupted, cancellation
    /// still flows through forced shutdown, never through silent
    /// abandonment of running workers, after which the executor rejects
    /// further work.
    ///
    /// # Errors
    ///
    /// In addition to the [`Stampede::run`] errors, returns
    /// [`StampedeError::InvalidConfiguration`] if the executor has fewer
    /// threads than the configured worker count (the workers could then
    /// never overlap fully).
    pub fn run_on(&self, executor: &BoundedExecutor) -> StampedeResult<RunVerdict> {
        self.validate()?;
        if executor.thread_count() < self.worker_count {
            return Err(StampedeError::InvalidConfiguration {
                message: format!(
                    "executor has {} threads but {} workers are required",
                    executor.thread_count(),
                    self.worker_count
                ),
            });
        }
        self.execute(executor, false)
    }

    fn validate(&self) -> StampedeResult<()> {
        if self.worker_count == 0 {
            return Err(StampedeError::InvalidConfiguration {
                message: "worker count must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, executor: &BoundedExecutor, owned: bool) -> StampedeResult<RunVerdict> {
        #[cfg(feature = "tracing")]
        info!(worker_count = self.worker_count, "starting concurrent run");

        let barrier = StartBarrier::new();
        let aggregator = Arc::new(FailureAggregator::new());
        let mut completions = Vec::with_capacity(self.worker_count);

        for _ in 0..self.worker_count {
            let op = Arc::clone(&self.op);
            let worker_barrier = barrier.clone();
            let aggregator = Arc::clone(&aggregator);
            let start_timeout = self.start_timeout;

            let submitted = executor.submit(move || {
                let outcome = run_worker(op.as_ref(), &worker_barrier, start_timeout);
                aggregator.record(outcome);
            });
            match submitted {
                Ok(completion) => completions.push(completion),
                Err(err) => {
                    // Unblock workers that were already scheduled, then tear
                    // the pool down before surfacing the error.
                    barrier.release();
                    executor.force_shutdown(self.shutdown_grace);
                    return Err(err);
                }
            }
        }

        // Every worker has been scheduled; let them loose together.
        barrier.release();

        let mut disrupted = false;
        for completion in &completions {
            match completion.wait_for(self.completion_timeout) {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    // Timed out or the controlling thread was interrupted:
                    // make waiting workers observe the interrupt and exit
                    // instead of hanging.
                    disrupted = true;
                    break;
                }
            }
        }

        if owned || disrupted {
            #[cfg(feature = "tracing")]
            debug!(disrupted, "shutting worker pool down");

            if !executor.force_shutdown(self.shutdown_grace) {
                // A slow-to-die worker is a leak signal, not a test failure.
                #[cfg(feature = "tracing")]
                warn!(
                    "possible resource leak: could not shut down executor in time; \
                     some workers may still be running"
                );
            }
        }

        // Workers that were torn down before they could report are classified
        // as interrupted, so the verdict always covers all N workers.
        let verdict = aggregator.verdict_for(self.worker_count);
        #[cfg(feature = "tracing")]
        match &verdict {
            RunVerdict::Success => info!("concurrent run passed"),
            RunVerdict::Failed(failure) => {
                error!(
                    attached = failure.attached().len(),
                    "concurrent run failed"
                );
            }
        }
        Ok(verdict)
    }
}

fn run_worker(op: &dyn Operation, barrier: &StartBarrier, start_timeout: Duration) -> WorkerOutcome {
    match barrier.wait(start_timeout) {
        Ok(true) => {}
        Ok(false) => {
            return WorkerOutcome::InvocationError {
                kind: InvocationErrorKind::Interrupted,
                cause: Some(Box::new(StampedeError::WaitTimeout {
                    waited: start_timeout,
                })),
            }
        }
        Err(_) => return InvokeError::interrupted().into_outcome(),
    }

    match catch_unwind(AssertUnwindSafe(|| op.invoke())) {
        Ok(Ok(())) => WorkerOutcome::Success,
        Ok(Err(err)) => err.into_outcome(),
        Err(payload) => WorkerOutcome::AssertionFailure {
            message: panic_message(payload.as_ref()),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `op` with the default worker count and panic with the umbrella
/// failure if any worker diverges.
///
/// Convenience sink for use directly inside tests.
#[track_caller]
pub fn assert_thread_safe(op: impl Operation + 'static) {
    assert_thread_safe_with(op, DEFAULT_WORKER_COUNT);
}

/// Run `op` across `worker_count` workers and panic with the umbrella
/// failure if any worker diverges.
#[track_caller]
pub fn assert_thread_safe_with(op: impl Operation + 'static, worker_count: usize) {
    match Stampede::new(op).worker_count(worker_count).run() {
        Ok(verdict) => verdict.assert_success(),
        Err(err) => panic!("{}", err),
    }
}
