// src/sink.rs

//! The shared log that job output is serialized into.
//!
//! Every supervisor and drainer writes to the same [`LogSink`], possibly from
//! many tasks at once. Implementations must therefore be `Send + Sync` and
//! accept concurrent calls. Lines from one stream arrive in stream order;
//! nothing is promised about interleaving across streams or jobs.

use std::sync::Arc;

use tracing::{error, info};

/// Severity a line is forwarded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Standard output and job status lines.
    Info,
    /// Standard error and handler failures.
    Error,
}

/// Thread-safe line writer that receives all job output and status lines.
pub trait LogSink: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);

    fn write(&self, severity: Severity, line: &str) {
        match severity {
            Severity::Info => self.info(line),
            Severity::Error => self.error(line),
        }
    }
}

/// Shared handle to a sink, as passed around the engine.
pub type SharedSink = Arc<dyn LogSink>;

/// Default sink: forwards lines as `tracing` events under the
/// `multiproc::job` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) {
        info!(target: "multiproc::job", "{line}");
    }

    fn error(&self, line: &str) {
        error!(target: "multiproc::job", "{line}");
    }
}
