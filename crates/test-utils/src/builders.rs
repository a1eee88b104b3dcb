#![allow(dead_code)]

use multiproc::config::{ConfigFile, ConfigSection, JobConfig, RawConfigFile};
use multiproc::types::CompletionPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                job: Vec::new(),
            },
        }
    }

    pub fn with_job(mut self, cmd: &str) -> Self {
        self.config.job.push(JobConfig {
            cmd: cmd.to_string(),
        });
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.config.config.concurrency_limit = Some(limit);
        self
    }

    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.config.config.policy = policy;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
