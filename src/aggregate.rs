//! Thread-safe collection of worker outcomes.

use parking_lot::Mutex;

use crate::outcome::{InvocationErrorKind, RunVerdict, UmbrellaFailure, WorkerOutcome};

#[derive(Default)]
struct State {
    failures: Vec<WorkerOutcome>,
    reported: usize,
}

/// Collects one [`WorkerOutcome`] per worker without letting a single raised
/// failure abort collection of the others.
///
/// All workers of a run share one aggregator; [`FailureAggregator::record`]
/// may be called concurrently. Failures are kept in insertion order, which is
/// completion order, not submission order. The ordering carries no meaning
/// beyond diagnostics.
pub struct FailureAggregator {
    state: Mutex<State>,
}

impl FailureAggregator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Record one worker's outcome. Success outcomes are counted but not
    /// retained.
    pub fn record(&self, outcome: WorkerOutcome) {
        let mut state = self.state.lock();
        state.reported += 1;
        if !outcome.is_success() {
            state.failures.push(outcome);
        }
    }

    /// Total number of outcomes recorded so far, successes included.
    pub fn recorded(&self) -> usize {
        self.state.lock().reported
    }

    /// Merge everything recorded so far into one verdict.
    ///
    /// Returns [`RunVerdict::Success`] if no non-success outcome was
    /// recorded, otherwise [`RunVerdict::Failed`] with every individual
    /// failure attached; none is ever discarded. Draining: a verdict is
    /// produced once per run.
    pub fn verdict(&self) -> RunVerdict {
        let failures = std::mem::take(&mut self.state.lock().failures);
        Self::build(failures)
    }

    /// Like [`FailureAggregator::verdict`], but accounts for workers that
    /// never reported: each of the `expected_workers - recorded` missing
    /// workers contributes an `Interrupted` invocation error, so the verdict
    /// always covers the full worker count even when a worker was forcibly
    /// terminated before it could report.
    ///
    /// Counting and draining happen under one lock, so a worker racing to
    /// report during the call is either included or covered by a synthesized
    /// entry, never both.
    pub fn verdict_for(&self, expected_workers: usize) -> RunVerdict {
        let mut state = self.state.lock();
        let missing = expected_workers.saturating_sub(state.reported);
        for _ in 0..missing {
            state.failures.push(WorkerOutcome::InvocationError {
                kind: InvocationErrorKind::Interrupted,
                cause: None,
            });
        }
        state.reported += missing;
        let failures = std::mem::take(&mut state.failures);
        drop(state);
        Self::build(failures)
    }

    fn build(failures: Vec<WorkerOutcome>) -> RunVerdict {
        if failures.is_empty() {
            RunVerdict::Success
        } else {
            RunVerdict::Failed(UmbrellaFailure::new(
                failures
                    .into_iter()
                    .filter_map(WorkerOutcome::into_attached)
                    .collect(),
            ))
        }
    }
}

impl Default for FailureAggregator {
    fn default() -> Self {
        Self::new()
    }
}
