//! Bounded teardown and interruption timing tests

mod shutdown;
