//! The operation abstraction and its failure type.
//!
//! An [`Operation`] is the unit of test logic the harness invokes
//! concurrently: something invokable with no explicit inputs that either
//! completes, panics (an assertion failure), or returns an [`InvokeError`]
//! (an operational failure). The target and any arguments are resolved by
//! the caller before the operation is handed to the harness, typically by
//! capturing them in an [`op_fn`] closure.

use std::error::Error;

use crate::error::StampedeError;
use crate::outcome::{InvocationErrorKind, WorkerOutcome};

/// A unit of test logic invoked concurrently by every worker.
///
/// One instance is shared by all workers of a run, so implementations must be
/// `Send + Sync`. Whatever shared state the operation touches beyond that is
/// exactly what the harness is designed to stress; the harness makes no
/// assumptions about it and does not serialize access to it.
///
/// Signal an assertion failure by panicking (`assert!`, `assert_eq!`, …);
/// the panic message is propagated to the verdict verbatim. Signal an
/// operational problem by returning an [`InvokeError`].
pub trait Operation: Send + Sync {
    fn invoke(&self) -> Result<(), InvokeError>;
}

/// An operational failure raised while invoking an operation.
///
/// Distinct from an assertion failure: invocation errors mean the attempt to
/// *run* the operation went wrong, and they are reported with a
/// harness-authored "Cannot test thread safety: " prefix so they cannot be
/// mistaken for a verdict about the code under test.
#[derive(Debug)]
pub struct InvokeError {
    kind: InvocationErrorKind,
    cause: Option<Box<dyn Error + Send + Sync>>,
}

impl InvokeError {
    /// An error with an explicit kind and cause.
    pub fn new(
        kind: InvocationErrorKind,
        cause: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            cause: Some(cause.into()),
        }
    }

    /// The operation raised an ordinary error.
    pub fn raised(cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::new(InvocationErrorKind::RaisedException, cause)
    }

    /// The invocation target was not accessible.
    pub fn not_accessible(cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::new(InvocationErrorKind::NotAccessible, cause)
    }

    /// The argument list did not match the target.
    pub fn bad_arguments(cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::new(InvocationErrorKind::BadArguments, cause)
    }

    /// One-time initialization of a dependency failed.
    pub fn init_failed(cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::new(InvocationErrorKind::InitFailed, cause)
    }

    /// The invoking thread was interrupted mid-call.
    pub fn interrupted() -> Self {
        Self::new(InvocationErrorKind::Interrupted, StampedeError::Interrupted)
    }

    /// The failure's kind.
    pub fn kind(&self) -> InvocationErrorKind {
        self.kind
    }

    pub(crate) fn into_outcome(self) -> WorkerOutcome {
        WorkerOutcome::InvocationError {
            kind: self.kind,
            cause: self.cause,
        }
    }
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind.describe())?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

impl Error for InvokeError {}

/// An [`Operation`] backed by a closure. Create with [`op_fn`].
pub struct OpFn<F> {
    f: F,
}

impl<F> Operation for OpFn<F>
where
    F: Fn() -> Result<(), InvokeError> + Send + Sync,
{
    fn invoke(&self) -> Result<(), InvokeError> {
        (self.f)()
    }
}

/// Convenience function to create an operation from a closure.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use stampede::op_fn;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let op = op_fn(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
/// # let _ = op;
/// ```
pub fn op_fn<F>(f: F) -> OpFn<F>
where
    F: Fn() -> Result<(), InvokeError> + Send + Sync,
{
    OpFn { f }
}
