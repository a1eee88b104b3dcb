// src/engine/tally.rs

use std::sync::atomic::{AtomicUsize, Ordering};

/// Count of jobs that exited non-zero during one batch.
///
/// Supervisors increment it exactly once per failed job; the controller reads
/// it without locking to decide whether to keep admitting commands. It never
/// decreases.
#[derive(Debug, Default)]
pub struct FailureTally {
    failed: AtomicUsize,
}

impl FailureTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed job and return the new total.
    pub fn record_failure(&self) -> usize {
        self.failed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// True once any job has failed.
    pub fn any(&self) -> bool {
        self.count() > 0
    }
}
