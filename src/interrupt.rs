//! Cooperative thread interruption.
//!
//! Worker threads have no preemptive interrupt in Rust, so the harness models
//! interruption as a sticky per-thread flag: an [`InterruptToken`]. The
//! executor installs one token per worker thread and trips them all during
//! forced shutdown. Operations under test may poll
//! [`InterruptToken::current`] to cooperate, and every blocking wait in this
//! crate observes the calling thread's token.
//!
//! Tripping a token also wakes the signal the owning thread is currently
//! blocked on. The notification takes the wait's own lock first, so it cannot
//! land in the window between the waiter's flag check and its park on the
//! condvar.
//!
//! A token is never cleared implicitly. An interrupted wait returns with the
//! flag still set, so later waits on the same thread keep failing until
//! [`InterruptToken::clear`] is called explicitly.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::signal::SignalCore;

thread_local! {
    static CURRENT: RefCell<Option<InterruptToken>> = const { RefCell::new(None) };
}

/// Sticky interruption flag for one thread.
///
/// Cloning yields another handle to the same flag, so a token obtained on one
/// thread can be tripped from any other.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stampede::{InterruptToken, StampedeError, WaitableSignal};
///
/// let token = InterruptToken::current();
/// token.interrupt();
///
/// let signal = WaitableSignal::new(1);
/// assert_eq!(
///     signal.wait_for(Duration::from_millis(10)),
///     Err(StampedeError::Interrupted)
/// );
/// assert!(token.is_interrupted());
/// token.clear();
/// ```
pub struct InterruptToken {
    shared: Arc<TokenShared>,
}

struct TokenShared {
    interrupted: AtomicBool,
    // The signal the owning thread is currently parked on, if any.
    wait_site: Mutex<Option<Arc<SignalCore>>>,
}

impl InterruptToken {
    fn new() -> Self {
        Self {
            shared: Arc::new(TokenShared {
                interrupted: AtomicBool::new(false),
                wait_site: Mutex::new(None),
            }),
        }
    }

    /// A token not yet bound to any thread. The executor creates one per
    /// worker and installs it from inside the worker thread.
    pub(crate) fn detached() -> Self {
        Self::new()
    }

    /// The calling thread's token.
    ///
    /// Executor worker threads get their token installed at startup. For any
    /// other thread a fresh token is created and bound on first use, so the
    /// harness's own controlling thread can be interrupted too.
    pub fn current() -> Self {
        CURRENT.with(|slot| {
            let mut slot = slot.borrow_mut();
            slot.get_or_insert_with(InterruptToken::new).clone()
        })
    }

    /// Trip the flag and wake the owning thread if it is blocked on one of
    /// this crate's signals.
    pub fn interrupt(&self) {
        self.shared.interrupted.store(true, Ordering::SeqCst);
        let site = self.shared.wait_site.lock();
        if let Some(site) = site.as_ref() {
            // Holding the wait's lock while notifying guarantees the waiter is
            // either parked (and gets woken) or has not yet re-checked the
            // flag (and will see it).
            let state = site.state.lock();
            site.cond.notify_all();
            drop(state);
        }
    }

    /// Whether the flag has been tripped. Does not clear it.
    pub fn is_interrupted(&self) -> bool {
        self.shared.interrupted.load(Ordering::SeqCst)
    }

    /// Reset the flag.
    pub fn clear(&self) {
        self.shared.interrupted.store(false, Ordering::SeqCst);
    }

    /// Bind this token as the calling thread's current token. Used by the
    /// executor when a worker thread starts.
    pub(crate) fn install(&self) {
        CURRENT.with(|slot| {
            *slot.borrow_mut() = Some(self.clone());
        });
    }

    /// Register the signal the calling thread is about to park on. The
    /// registration is dropped with the returned guard.
    pub(crate) fn enter_wait(&self, site: Arc<SignalCore>) -> WaitGuard<'_> {
        *self.shared.wait_site.lock() = Some(site);
        WaitGuard { token: self }
    }
}

impl Clone for InterruptToken {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl std::fmt::Debug for InterruptToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptToken")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

// Guard to ensure the wait-site registration is removed even on early return
// or panic
pub(crate) struct WaitGuard<'t> {
    token: &'t InterruptToken,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        *self.token.shared.wait_site.lock() = None;
    }
}
