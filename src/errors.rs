// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only launch-level problems are hard errors for callers of the controller.
//! Non-zero exits are values (see [`crate::engine::JobState`]) and stream
//! read failures are only logged.

use thiserror::Error;

use crate::engine::JobIndex;

#[derive(Error, Debug)]
pub enum MultiprocError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The process for a job could not be spawned.
    #[error("failed to launch job {index} ({command}): {source}")]
    LaunchFailed {
        index: JobIndex,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The supervisor could not observe the exit status of a launched job.
    #[error("exit status of job {index} could not be observed")]
    StatusUnavailable { index: JobIndex },

    #[error("supervisor for job {index} failed: {reason}")]
    SupervisorFailed { index: JobIndex, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MultiprocError {
    /// True for errors raised while launching or awaiting jobs, as opposed to
    /// configuration or CLI problems.
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            MultiprocError::LaunchFailed { .. }
                | MultiprocError::StatusUnavailable { .. }
                | MultiprocError::SupervisorFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MultiprocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_message_names_job_and_command() {
        let err = MultiprocError::LaunchFailed {
            index: 3,
            command: "no-such-binary --flag".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        let msg = err.to_string();
        assert!(msg.contains("job 3"));
        assert!(msg.contains("no-such-binary --flag"));
        assert!(err.is_launch_error());
    }

    #[test]
    fn config_errors_are_not_launch_errors() {
        let err = MultiprocError::ConfigError("bad".into());
        assert!(!err.is_launch_error());
    }
}
