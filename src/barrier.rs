//! One-shot start barrier.
//!
//! Workers submitted by the harness park on a [`StartBarrier`] until every
//! one of them has been scheduled, then all are released at (approximately)
//! the same instant. An unsynchronized start would let workers run one after
//! another and mask the very races the harness exists to provoke.

use std::time::Duration;

use crate::error::StampedeResult;
use crate::signal::WaitableSignal;

/// One-shot gate that releases all waiting threads at once.
///
/// Internally a countdown of one: the barrier transitions from armed to
/// released exactly once and is never re-armed. Cloning yields another handle
/// to the same gate.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
/// use stampede::StartBarrier;
///
/// let barrier = StartBarrier::new();
/// let waiter = barrier.clone();
/// let handle = thread::spawn(move || waiter.wait(Duration::from_secs(5)));
///
/// barrier.release();
/// assert_eq!(handle.join().unwrap(), Ok(true));
/// ```
pub struct StartBarrier {
    gate: WaitableSignal,
}

impl StartBarrier {
    /// Create an armed barrier.
    pub fn new() -> Self {
        Self {
            gate: WaitableSignal::new(1),
        }
    }

    /// Block until the barrier is released or `timeout` elapses.
    ///
    /// Returns `Ok(true)` on release and `Ok(false)` on timeout. Waiting on
    /// an already released barrier returns immediately with `Ok(true)`. If
    /// the calling thread is interrupted the wait fails with
    /// [`StampedeError::Interrupted`](crate::StampedeError::Interrupted),
    /// distinguishable from a timeout, and the thread's interrupt flag stays
    /// set.
    pub fn wait(&self, timeout: Duration) -> StampedeResult<bool> {
        self.gate.wait_for(timeout)
    }

    /// Release the barrier, waking all current waiters and letting all future
    /// waits pass immediately.
    ///
    /// Releasing an already released barrier is a no-op.
    pub fn release(&self) {
        self.gate.arrive();
    }

    /// Whether the barrier has been released.
    pub fn is_released(&self) -> bool {
        self.gate.remaining() == 0
    }
}

impl Default for StartBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StartBarrier {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
        }
    }
}
