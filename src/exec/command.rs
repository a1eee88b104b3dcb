// src/exec/command.rs

use std::io;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::trace;

use crate::engine::JobIndex;
use crate::errors::{MultiprocError, Result};

/// A command string split into program and arguments.
///
/// Tokens are separated by whitespace; there is no quoting or escaping, so
/// an argument can never contain a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Returns `None` for a blank command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
        })
    }

    /// Build the process with both output streams piped and stdin closed.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Spawn the process for job `index`.
///
/// Both a blank command and an OS-level spawn error are reported as
/// [`MultiprocError::LaunchFailed`].
pub fn spawn(index: JobIndex, line: &str) -> Result<Child> {
    let launch_failed = |source: io::Error| MultiprocError::LaunchFailed {
        index,
        command: line.to_string(),
        source,
    };

    let cmdline = CommandLine::parse(line)
        .ok_or_else(|| launch_failed(io::Error::new(io::ErrorKind::InvalidInput, "empty command")))?;

    trace!(job = index, program = %cmdline.program, args = ?cmdline.args, "spawn");

    cmdline.to_command().spawn().map_err(launch_failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let cmd = CommandLine::parse("  ping\thost  -c 3 ").unwrap();
        assert_eq!(cmd.program, "ping");
        assert_eq!(cmd.args, vec!["host", "-c", "3"]);
    }

    #[test]
    fn quotes_are_not_special() {
        let cmd = CommandLine::parse("echo 'a b'").unwrap();
        assert_eq!(cmd.args, vec!["'a", "b'"]);
    }

    #[test]
    fn blank_command_does_not_parse() {
        assert_eq!(CommandLine::parse("   "), None);
        assert_eq!(CommandLine::parse(""), None);
    }

    #[tokio::test]
    async fn blank_command_is_a_launch_failure() {
        let err = spawn(4, " ").unwrap_err();
        assert!(matches!(err, MultiprocError::LaunchFailed { index: 4, .. }));
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_failure() {
        let err = spawn(1, "multiproc-definitely-not-a-real-binary").unwrap_err();
        match err {
            MultiprocError::LaunchFailed { index, command, source } => {
                assert_eq!(index, 1);
                assert_eq!(command, "multiproc-definitely-not-a-real-binary");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected LaunchFailed, got {other:?}"),
        }
    }
}
