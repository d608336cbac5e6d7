//! Configuration boundary and edge case tests
//!
//! Everything here must fail fast, before any worker thread is spawned.

mod config;
