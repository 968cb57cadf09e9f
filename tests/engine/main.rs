//! Engine Integration Tests
//!
//! End-to-end behavior of the engine over the in-memory stores:
//! - scope closure over generated hierarchies
//! - change log reads against a live appender
//! - index maintenance through the registry and router
//! - concurrent use of one engine

#[path = "../common/mod.rs"]
mod common;

mod change_log;
mod concurrency;
mod maintenance;
mod scope_closure;
