//! Waitable countdown signal.
//!
//! [`WaitableSignal`] is the one blocking primitive everything else in the
//! crate is built on: the start barrier, per-worker completion handles, and
//! the executor's forced-shutdown wait. It wraps "wait for a count to reach
//! zero within a timeout, without swallowing interruption" behind a
//! non-asserting form ([`WaitableSignal::wait_for`]) and an asserting form
//! ([`WaitableSignal::assert_reached`]).

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{StampedeError, StampedeResult};
use crate::interrupt::InterruptToken;

// Shared by the signal and by InterruptToken, which locks `state` before
// notifying `cond` to deliver a wakeup that cannot be lost.
pub(crate) struct SignalCore {
    pub(crate) state: Mutex<u32>,
    pub(crate) cond: Condvar,
}

enum Wait {
    Reached,
    TimedOut,
    Interrupted,
}

/// Countdown signal with interruptible, bounded waits.
///
/// Cloning yields another handle to the same count, so one side can arrive
/// while the other waits.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
/// use stampede::WaitableSignal;
///
/// let signal = WaitableSignal::new(2);
/// let arriver = signal.clone();
/// thread::spawn(move || {
///     arriver.arrive();
///     arriver.arrive();
/// });
///
/// assert_eq!(signal.wait_for(Duration::from_secs(5)), Ok(true));
/// ```
pub struct WaitableSignal {
    core: Arc<SignalCore>,
}

impl WaitableSignal {
    /// Create a signal that is reached once `count` arrivals have happened.
    ///
    /// A count of zero is allowed and means already reached.
    pub fn new(count: u32) -> Self {
        Self {
            core: Arc::new(SignalCore {
                state: Mutex::new(count),
                cond: Condvar::new(),
            }),
        }
    }

    /// Record one arrival. Saturates at zero, so arriving at an already
    /// reached signal is a no-op. The final arrival wakes all waiters.
    pub fn arrive(&self) {
        let mut remaining = self.core.state.lock();
        match *remaining {
            0 => {}
            1 => {
                *remaining = 0;
                self.core.cond.notify_all();
            }
            _ => *remaining -= 1,
        }
    }

    /// Arrivals still outstanding.
    pub fn remaining(&self) -> u32 {
        *self.core.state.lock()
    }

    /// Non-asserting wait: block until the count reaches zero or `timeout`
    /// elapses.
    ///
    /// Returns `Ok(true)` if the count reached zero in time and `Ok(false)`
    /// on timeout. If the calling thread's [`InterruptToken`] is tripped
    /// before or during the wait, returns
    /// [`Err(StampedeError::Interrupted)`](StampedeError::Interrupted) and
    /// leaves the flag set; an interrupted wait never reports a misleading
    /// success.
    pub fn wait_for(&self, timeout: Duration) -> StampedeResult<bool> {
        match self.wait(timeout) {
            Wait::Reached => Ok(true),
            Wait::TimedOut => Ok(false),
            Wait::Interrupted => Err(StampedeError::Interrupted),
        }
    }

    /// Asserting wait: like [`WaitableSignal::wait_for`], but a timeout is an
    /// error.
    ///
    /// Returns [`StampedeError::WaitTimeout`] if the count did not reach zero
    /// within `timeout` and [`StampedeError::Interrupted`] under the same
    /// conditions as the non-asserting form.
    pub fn assert_reached(&self, timeout: Duration) -> StampedeResult<()> {
        match self.wait(timeout) {
            Wait::Reached => Ok(()),
            Wait::TimedOut => Err(StampedeError::WaitTimeout { waited: timeout }),
            Wait::Interrupted => Err(StampedeError::Interrupted),
        }
    }

    fn wait(&self, timeout: Duration) -> Wait {
        let token = InterruptToken::current();
        let deadline = Instant::now() + timeout;

        // Registration must precede the lock: interrupt() takes the wait-site
        // slot, then `state`, so once we hold `state` no trip can go unseen.
        let _registration = token.enter_wait(Arc::clone(&self.core));
        let mut remaining = self.core.state.lock();
        loop {
            if *remaining == 0 {
                return Wait::Reached;
            }
            if token.is_interrupted() {
                return Wait::Interrupted;
            }
            if self.core.cond.wait_until(&mut remaining, deadline).timed_out() {
                return if *remaining == 0 {
                    Wait::Reached
                } else if token.is_interrupted() {
                    Wait::Interrupted
                } else {
                    Wait::TimedOut
                };
            }
        }
    }
}

impl Clone for WaitableSignal {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl std::fmt::Debug for WaitableSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitableSignal")
            .field("remaining", &self.remaining())
            .finish()
    }
}
