// Common test utilities for the test suite

#![allow(dead_code)]

use std::time::Duration;

/// Generous bound for waits that are expected to finish almost immediately.
pub const LONG: Duration = Duration::from_secs(5);

/// Default-sized grace period for shutting executors down in tests.
pub const GRACE: Duration = Duration::from_millis(500);
