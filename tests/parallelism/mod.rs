//! Parallelism proof tests

mod overlap;
