// src/config/model.rs

use serde::Deserialize;

use crate::types::CompletionPolicy;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// concurrency_limit = 4
/// policy = "fail_fast"
///
/// [[job]]
/// cmd = "make -C docs"
///
/// [[job]]
/// cmd = "cargo test --workspace"
/// ```
///
/// All sections are optional. Convert into a [`ConfigFile`] with `TryFrom`
/// to validate it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Commands from `[[job]]`, in file order.
    #[serde(default)]
    pub job: Vec<JobConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of jobs running at the same time.
    ///
    /// If `None`, the available parallelism of the machine is used.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,

    /// `"fail_fast"` (default) or `"run_all"`.
    #[serde(default)]
    pub policy: CompletionPolicy,
}

/// One `[[job]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    /// The command to execute, split on whitespace (no quoting).
    pub cmd: String,
}

/// A validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    jobs: Vec<JobConfig>,
}

impl ConfigFile {
    /// Only called from the validating `TryFrom<RawConfigFile>`.
    pub(crate) fn new_unchecked(config: ConfigSection, jobs: Vec<JobConfig>) -> Self {
        Self { config, jobs }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn jobs(&self) -> &[JobConfig] {
        &self.jobs
    }

    /// The job commands in file order.
    pub fn commands(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.cmd.clone()).collect()
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.config.policy
    }

    /// Configured limit, falling back to the machine's available parallelism.
    pub fn concurrency_limit(&self) -> usize {
        self.config
            .concurrency_limit
            .unwrap_or_else(default_concurrency_limit)
    }
}

/// Number of jobs to run at once when nothing else is configured.
pub fn default_concurrency_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
