// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`gate`] bounds how many jobs are live at once.
//! - [`tally`] counts failed jobs for the fail-fast policy.
//! - [`controller`] admits and launches commands in order and turns job
//!   outcomes into a status code or an exit-code list.
//!
//! Per-process supervision lives in [`crate::exec`].

use std::process::ExitStatus;

pub mod controller;
pub mod gate;
pub mod tally;

pub use controller::Controller;
pub use gate::{kill_switch, AdmissionGate, KillSignal, KillSwitch};
pub use tally::FailureTally;

/// 1-based position of a command in the input sequence.
pub type JobIndex = usize;

/// Exit code reported for a process that was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// How a job's process ended, as observed by its supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobExit {
    /// Normal exit with a code.
    Code(i32),
    /// Terminated by a signal (including forced termination).
    Signal,
}

impl JobExit {
    /// Exit code, with signal termination mapped to [`SIGNAL_EXIT_CODE`].
    pub fn code(self) -> i32 {
        match self {
            JobExit::Code(code) => code,
            JobExit::Signal => SIGNAL_EXIT_CODE,
        }
    }

    pub fn success(self) -> bool {
        self == JobExit::Code(0)
    }
}

impl From<ExitStatus> for JobExit {
    fn from(status: ExitStatus) -> Self {
        status.code().map(JobExit::Code).unwrap_or(JobExit::Signal)
    }
}

/// Lifecycle of one command within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Not launched (yet, or ever once fail-fast stopped admission).
    Pending,
    /// Holding a gate slot, process not spawned yet.
    Admitted,
    /// Process spawned, outcome not known yet.
    Running,
    Succeeded,
    Failed(i32),
    /// Still live when fail-fast resolution reached it, so it was killed.
    ForciblyTerminated,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed(_) | JobState::ForciblyTerminated
        )
    }

    /// Exit code if the job ended on its own.
    pub fn exit_code(self) -> Option<i32> {
        match self {
            JobState::Succeeded => Some(0),
            JobState::Failed(code) => Some(code),
            _ => None,
        }
    }
}

impl From<JobExit> for JobState {
    fn from(exit: JobExit) -> Self {
        match exit {
            JobExit::Code(0) => JobState::Succeeded,
            other => JobState::Failed(other.code()),
        }
    }
}

/// Per-command result record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub index: JobIndex,
    pub command: String,
    pub state: JobState,
}

impl JobRecord {
    pub fn pending(index: JobIndex, command: impl Into<String>) -> Self {
        Self {
            index,
            command: command.into(),
            state: JobState::Pending,
        }
    }

    pub fn launched(&self) -> bool {
        !matches!(self.state, JobState::Pending | JobState::Admitted)
    }
}

/// Outcome of a fail-fast batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// 0 if every launched job exited 0, otherwise 1.
    pub status: i32,
    /// One record per input command, in input order.
    pub jobs: Vec<JobRecord>,
    /// Largest number of jobs that were live at the same time.
    pub peak_running: usize,
    /// How many admissions had to wait for a free slot.
    pub blocked_admissions: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }

    pub fn launched(&self) -> usize {
        self.jobs.iter().filter(|j| j.launched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_maps_to_state() {
        assert_eq!(JobState::from(JobExit::Code(0)), JobState::Succeeded);
        assert_eq!(JobState::from(JobExit::Code(3)), JobState::Failed(3));
        assert_eq!(
            JobState::from(JobExit::Signal),
            JobState::Failed(SIGNAL_EXIT_CODE)
        );
    }

    #[test]
    fn forced_termination_has_no_exit_code() {
        assert!(JobState::ForciblyTerminated.is_terminal());
        assert_eq!(JobState::ForciblyTerminated.exit_code(), None);
        assert!(!JobState::Running.is_terminal());
    }
}
