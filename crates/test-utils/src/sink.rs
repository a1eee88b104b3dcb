use std::sync::Mutex;

use multiproc::sink::{LogSink, Severity};

/// Log sink that records every line so tests can assert on output.
///
/// Lines are also echoed through `tracing` so they show up next to the
/// engine's own diagnostics when a test fails.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines in the order they were written.
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.with_severity(Severity::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_severity(Severity::Error)
    }

    pub fn has_info(&self, line: &str) -> bool {
        self.infos().iter().any(|l| l == line)
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors().iter().any(|l| l.contains(needle))
    }

    /// Position of the first line equal to `line`, any severity.
    pub fn position(&self, line: &str) -> Option<usize> {
        self.lines().iter().position(|(_, l)| l == line)
    }

    fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, l)| l.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn info(&self, line: &str) {
        tracing::info!(target: "multiproc::test", "{line}");
        self.lines.lock().unwrap().push((Severity::Info, line.to_string()));
    }

    fn error(&self, line: &str) {
        tracing::error!(target: "multiproc::test", "{line}");
        self.lines.lock().unwrap().push((Severity::Error, line.to_string()));
    }
}
