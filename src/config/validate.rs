// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MultiprocError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MultiprocError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.job))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_jobs(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // policy is strongly typed and validated during deserialization.

    if cfg.config.concurrency_limit == Some(0) {
        return Err(MultiprocError::ConfigError(
            "[config].concurrency_limit must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_jobs(cfg: &RawConfigFile) -> Result<()> {
    for (pos, job) in cfg.job.iter().enumerate() {
        if job.cmd.trim().is_empty() {
            return Err(MultiprocError::ConfigError(format!(
                "[[job]] #{} has an empty `cmd`",
                pos + 1
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{ConfigSection, JobConfig};
    use crate::types::CompletionPolicy;

    fn raw(limit: Option<usize>, cmds: &[&str]) -> RawConfigFile {
        RawConfigFile {
            config: ConfigSection {
                concurrency_limit: limit,
                policy: CompletionPolicy::FailFast,
            },
            job: cmds
                .iter()
                .map(|c| JobConfig { cmd: c.to_string() })
                .collect(),
        }
    }

    #[test]
    fn accepts_a_config_without_jobs() {
        let cfg = ConfigFile::try_from(raw(Some(2), &[])).unwrap();
        assert!(cfg.jobs().is_empty());
        assert_eq!(cfg.concurrency_limit(), 2);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ConfigFile::try_from(raw(Some(0), &["true"])).unwrap_err();
        assert!(matches!(err, MultiprocError::ConfigError(msg) if msg.contains("concurrency_limit")));
    }

    #[test]
    fn rejects_blank_commands() {
        let err = ConfigFile::try_from(raw(None, &["true", "   "])).unwrap_err();
        match err {
            MultiprocError::ConfigError(msg) => assert!(msg.contains("#2")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn missing_limit_falls_back_to_available_parallelism() {
        let cfg = ConfigFile::try_from(raw(None, &["true"])).unwrap();
        assert!(cfg.concurrency_limit() >= 1);
    }
}
