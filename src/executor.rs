//! Bounded worker pool with forced-shutdown semantics.
//!
//! [`BoundedExecutor`] owns a fixed number of named worker threads. The
//! underlying pool is created lazily on first submission and at most once,
//! even when multiple threads race to submit. Shutdown is always forced:
//! every worker's [`InterruptToken`] is tripped, intake stops, and the caller
//! gets at most a grace period of blocking before being told whether the
//! pool died cleanly.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::error::{StampedeError, StampedeResult};
use crate::interrupt::InterruptToken;
use crate::signal::WaitableSignal;

/// Supplies names for worker threads.
///
/// Names should make threads easy to tell apart; implementations are advised
/// but not forced to make them unique.
pub trait ThreadNameFactory: Send + Sync {
    fn generate(&self) -> String;
}

/// [`ThreadNameFactory`] producing `prefix-0`, `prefix-1`, … Names are unique
/// per factory instance.
pub struct SequencedNameFactory {
    prefix: String,
    next: AtomicUsize,
}

impl SequencedNameFactory {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(0),
        }
    }
}

impl ThreadNameFactory for SequencedNameFactory {
    fn generate(&self) -> String {
        format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::Relaxed))
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to one submitted job's completion.
///
/// Completion is signaled after the job has finished running, whether it
/// returned or panicked. A job still queued when shutdown begins never
/// completes.
pub struct Completion {
    done: WaitableSignal,
}

impl Completion {
    /// Non-asserting wait for the job to finish. See
    /// [`WaitableSignal::wait_for`] for the timeout and interruption
    /// contract.
    pub fn wait_for(&self, timeout: Duration) -> StampedeResult<bool> {
        self.done.wait_for(timeout)
    }

    /// Asserting wait for the job to finish. See
    /// [`WaitableSignal::assert_reached`].
    pub fn assert_reached(&self, timeout: Duration) -> StampedeResult<()> {
        self.done.assert_reached(timeout)
    }
}

struct PoolCore {
    // Option so shutdown can drop the sender, disconnecting idle workers.
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    tokens: Vec<InterruptToken>,
    exited: WaitableSignal,
}

/// Lazily-created, fixed-size worker pool with named threads.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stampede::{BoundedExecutor, SequencedNameFactory};
///
/// let executor = BoundedExecutor::new(4, SequencedNameFactory::new("worker"))?;
/// let completion = executor.submit(|| {
///     // runs on a thread named "worker-0" .. "worker-3"
/// })?;
/// completion.assert_reached(Duration::from_secs(5))?;
/// assert!(executor.force_shutdown(Duration::from_millis(500)));
/// # Ok::<(), stampede::StampedeError>(())
/// ```
pub struct BoundedExecutor {
    thread_count: usize,
    name_factory: Arc<dyn ThreadNameFactory>,
    pool: Mutex<Option<Arc<PoolCore>>>,
    shutdown: AtomicBool,
}

impl BoundedExecutor {
    /// Create an executor that will run work on `thread_count` named
    /// threads.
    ///
    /// No thread is spawned until the first [`BoundedExecutor::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`StampedeError::InvalidConfiguration`] if `thread_count` is
    /// zero.
    pub fn new(
        thread_count: usize,
        name_factory: impl ThreadNameFactory + 'static,
    ) -> StampedeResult<Self> {
        if thread_count == 0 {
            return Err(StampedeError::InvalidConfiguration {
                message: "thread count must be a positive integer".to_string(),
            });
        }
        Ok(Self {
            thread_count,
            name_factory: Arc::new(name_factory),
            pool: Mutex::new(None),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Number of worker threads this executor runs.
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Submit a job, spawning the pool on first use.
    ///
    /// The returned [`Completion`] is signaled when the job finishes. A
    /// panicking job does not take its worker thread down.
    ///
    /// # Errors
    ///
    /// Returns [`StampedeError::ExecutorShutDown`] once shutdown has been
    /// initiated, and [`StampedeError::ThreadSpawnFailed`] if the pool could
    /// not be created.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> StampedeResult<Completion> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(StampedeError::ExecutorShutDown);
        }
        let pool = self.pool()?;

        let done = WaitableSignal::new(1);
        let signal = done.clone();
        let wrapped: Job = Box::new(move || {
            // A panicking job must still signal completion.
            let _ = catch_unwind(AssertUnwindSafe(job));
            signal.arrive();
        });

        let sender = pool.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx
                .send(wrapped)
                .map_err(|_| StampedeError::ExecutorShutDown)?,
            None => return Err(StampedeError::ExecutorShutDown),
        }
        Ok(Completion { done })
    }

    /// Interrupt all running work, stop accepting new work, and wait up to
    /// `grace` for the worker threads to exit.
    ///
    /// Returns whether all workers exited in time; a timeout is reported as
    /// `false`, never as an error. If the calling thread is itself
    /// interrupted while waiting, the wait is abandoned, the caller's
    /// interrupt flag stays set, and `false` is returned. Safe to call
    /// multiple times; never blocks longer than `grace`.
    pub fn force_shutdown(&self, grace: Duration) -> bool {
        // Flag and pool slot change together under the slot lock, so a racing
        // first submit either sees the flag or its pool is seen here.
        let pool = {
            let slot = self.pool.lock();
            self.shutdown.store(true, Ordering::SeqCst);
            slot.clone()
        };
        let Some(pool) = pool else {
            // Pool was never created; nothing is running.
            return true;
        };

        #[cfg(feature = "tracing")]
        debug!(grace_ms = grace.as_millis() as u64, "forcing executor shutdown");

        pool.sender.lock().take();
        for token in &pool.tokens {
            token.interrupt();
        }

        match pool.exited.wait_for(grace) {
            Ok(all_exited) => all_exited,
            Err(_) => false,
        }
    }

    // Lazy pool creation: exactly one pool is created even if multiple
    // callers race to submit.
    fn pool(&self) -> StampedeResult<Arc<PoolCore>> {
        let mut slot = self.pool.lock();
        if let Some(pool) = slot.as_ref() {
            return Ok(Arc::clone(pool));
        }
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(StampedeError::ExecutorShutDown);
        }

        #[cfg(feature = "tracing")]
        debug!(thread_count = self.thread_count, "spawning worker pool");

        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let exited = WaitableSignal::new(self.thread_count as u32);
        let mut tokens = Vec::with_capacity(self.thread_count);

        for _ in 0..self.thread_count {
            let name = self.name_factory.generate();
            let token = InterruptToken::detached();
            let worker_token = token.clone();
            let worker_rx = Arc::clone(&rx);
            let worker_exited = exited.clone();

            #[cfg(feature = "tracing")]
            trace!(thread_name = %name, "spawning worker thread");

            thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_main(worker_rx, worker_token, worker_exited))
                .map_err(|e| StampedeError::ThreadSpawnFailed {
                    thread_name: name,
                    message: e.to_string(),
                })?;
            tokens.push(token);
        }

        let pool = Arc::new(PoolCore {
            sender: Mutex::new(Some(tx)),
            tokens,
            exited,
        });
        *slot = Some(Arc::clone(&pool));
        Ok(pool)
    }
}

fn worker_main(
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    token: InterruptToken,
    exited: WaitableSignal,
) {
    token.install();
    loop {
        if token.is_interrupted() {
            break;
        }
        // The receiver lock is held across the blocking recv; dropping the
        // sender at shutdown disconnects every idle worker in turn.
        let job = { rx.lock().recv() };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
    exited.arrive();
}
