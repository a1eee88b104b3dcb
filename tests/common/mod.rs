#![allow(dead_code)]

use std::sync::Arc;

use multiproc::engine::Controller;
use multiproc_test_utils::MemorySink;

pub use multiproc_test_utils::{init_tracing, with_timeout, ScriptDir};

/// Controller wired to a fresh in-memory sink.
pub fn controller(limit: usize) -> (Controller, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Controller::new(limit, sink.clone()), sink)
}
