//! Error types for harness configuration and waiting.
//!
//! This module defines the errors that can occur while configuring a run or
//! waiting on one of the harness's synchronization primitives. Failures of
//! the operation under test are not errors in this sense; they are collected
//! as [`WorkerOutcome`](crate::WorkerOutcome) values and reported through the
//! [`RunVerdict`](crate::RunVerdict).

use std::time::Duration;

/// Errors that can occur during harness configuration and synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StampedeError {
    /// A configuration value was rejected before any thread was spawned
    InvalidConfiguration { message: String },
    /// Work was submitted to an executor after shutdown had been initiated
    ExecutorShutDown,
    /// The operating system refused to spawn a worker thread
    ThreadSpawnFailed {
        thread_name: String,
        message: String,
    },
    /// An asserting wait did not observe its condition in time
    WaitTimeout { waited: Duration },
    /// The waiting thread was interrupted; its interrupt flag remains set
    Interrupted,
}

impl std::fmt::Display for StampedeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StampedeError::InvalidConfiguration { message } => {
                write!(f, "invalid configuration: {}", message)
            }
            StampedeError::ExecutorShutDown => {
                write!(f, "executor has been shut down and no longer accepts work")
            }
            StampedeError::ThreadSpawnFailed {
                thread_name,
                message,
            } => {
                write!(
                    f,
                    "could not spawn worker thread '{}': {}",
                    thread_name, message
                )
            }
            StampedeError::WaitTimeout { waited } => {
                write!(f, "waiting timed out after {:?}", waited)
            }
            StampedeError::Interrupted => {
                write!(f, "thread was interrupted while waiting")
            }
        }
    }
}

impl std::error::Error for StampedeError {}

/// Result type for harness operations
pub type StampedeResult<T> = Result<T, StampedeError>;
