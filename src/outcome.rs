//! Per-worker outcomes and the aggregate run verdict.
//!
//! Every worker produces exactly one [`WorkerOutcome`] per run. Non-success
//! outcomes are merged into a single [`UmbrellaFailure`] so that one worker's
//! failure never hides another's: the caller inspects the attached list to
//! see exactly which and how many workers diverged.

use std::error::Error;

/// Why an invocation attempt failed for operational reasons.
///
/// These describe problems with *running* the operation, as opposed to
/// assertion failures raised by the operation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvocationErrorKind {
    /// The invocation target was not accessible
    NotAccessible,
    /// The argument list did not match the target
    BadArguments,
    /// The operation raised an error other than an assertion failure
    RaisedException,
    /// One-time initialization of a dependency failed
    InitFailed,
    /// The invoking thread was interrupted mid-call
    Interrupted,
}

impl InvocationErrorKind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            InvocationErrorKind::NotAccessible => "target is not accessible.",
            InvocationErrorKind::BadArguments => "arguments are wrong.",
            InvocationErrorKind::RaisedException => "operation raised an error.",
            InvocationErrorKind::InitFailed => "initialization failed.",
            InvocationErrorKind::Interrupted => "invocation was interrupted.",
        }
    }
}

/// Result of one worker's attempt to run the operation.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// The operation completed normally
    Success,
    /// The operation itself signaled a test assertion failure (a panic); the
    /// message is propagated verbatim, never re-wrapped
    AssertionFailure { message: String },
    /// The attempt to invoke the operation failed for an operational reason
    InvocationError {
        kind: InvocationErrorKind,
        cause: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl WorkerOutcome {
    /// Whether this outcome is [`WorkerOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerOutcome::Success)
    }

    pub(crate) fn into_attached(self) -> Option<AttachedFailure> {
        match self {
            WorkerOutcome::Success => None,
            WorkerOutcome::AssertionFailure { message } => Some(AttachedFailure {
                message,
                kind: None,
                cause: None,
            }),
            WorkerOutcome::InvocationError { kind, cause } => Some(AttachedFailure {
                message: format!("Cannot test thread safety: {}", kind.describe()),
                kind: Some(kind),
                cause,
            }),
        }
    }
}

/// One failure attached to an [`UmbrellaFailure`].
#[derive(Debug)]
pub struct AttachedFailure {
    message: String,
    kind: Option<InvocationErrorKind>,
    cause: Option<Box<dyn Error + Send + Sync>>,
}

impl AttachedFailure {
    /// The failure's own message. Assertion failures keep the message the
    /// operation raised; invocation errors carry the harness-authored
    /// "Cannot test thread safety: " prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The operational error kind, or `None` for an assertion failure.
    pub fn kind(&self) -> Option<InvocationErrorKind> {
        self.kind
    }

    /// Whether this entry is an assertion failure raised by the operation
    /// under test.
    pub fn is_assertion_failure(&self) -> bool {
        self.kind.is_none()
    }

    /// The underlying cause, if one was attached.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl std::fmt::Display for AttachedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

/// Fixed top-line message of every [`UmbrellaFailure`].
pub const UMBRELLA_MESSAGE: &str =
    "problems occurred while running concurrently; inspect attached failures";

/// The single aggregate failure of a run, carrying every worker's individual
/// failure in completion order.
#[derive(Debug)]
pub struct UmbrellaFailure {
    attached: Vec<AttachedFailure>,
}

impl UmbrellaFailure {
    pub(crate) fn new(attached: Vec<AttachedFailure>) -> Self {
        Self { attached }
    }

    /// All attached failures, in the order workers reported them.
    pub fn attached(&self) -> &[AttachedFailure] {
        &self.attached
    }
}

impl std::fmt::Display for UmbrellaFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", UMBRELLA_MESSAGE)?;
        for (i, failure) in self.attached.iter().enumerate() {
            write!(f, "\n  [{}] {}", i + 1, failure)?;
        }
        Ok(())
    }
}

impl Error for UmbrellaFailure {}

/// Aggregate of all worker outcomes for one run.
///
/// Produced once per run. A run is failed as soon as any single worker
/// diverges; the harness never retries or averages outcomes out.
#[derive(Debug)]
pub enum RunVerdict {
    /// Every worker completed normally
    Success,
    /// At least one worker diverged; all individual failures are attached
    Failed(UmbrellaFailure),
}

impl RunVerdict {
    /// Whether every worker completed normally.
    pub fn is_success(&self) -> bool {
        matches!(self, RunVerdict::Success)
    }

    /// The umbrella failure, if the run failed.
    pub fn failure(&self) -> Option<&UmbrellaFailure> {
        match self {
            RunVerdict::Success => None,
            RunVerdict::Failed(failure) => Some(failure),
        }
    }

    /// Reporting-sink hook: pass silently on success, panic with the full
    /// umbrella rendering on failure so the surrounding test framework sees
    /// exactly one failure with every worker's problem attached.
    #[track_caller]
    pub fn assert_success(self) {
        if let RunVerdict::Failed(failure) = self {
            panic!("{}", failure);
        }
    }
}
