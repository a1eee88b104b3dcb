// src/plan.rs

//! Resolve CLI arguments and an optional config file into one run plan.
//!
//! Commands are concatenated in this order: `[[job]]` entries from the
//! config, lines of `--commands-file`, positional arguments. Flags override
//! config values, which override built-in defaults.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{default_concurrency_limit, default_config_path, load_and_validate, ConfigFile};
use crate::errors::Result;
use crate::types::CompletionPolicy;

/// Everything needed to start a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub commands: Vec<String>,
    pub concurrency_limit: usize,
    pub policy: CompletionPolicy,
}

pub fn resolve(args: &CliArgs) -> Result<RunPlan> {
    let config = load_config(args)?;

    let mut commands = config.as_ref().map(ConfigFile::commands).unwrap_or_default();
    if let Some(path) = &args.commands_file {
        commands.extend(read_commands_file(path)?);
    }
    commands.extend(args.commands.iter().cloned());

    let concurrency_limit = args
        .jobs
        .map(|n| n as usize)
        .or_else(|| config.as_ref().map(ConfigFile::concurrency_limit))
        .unwrap_or_else(default_concurrency_limit);

    let policy = args
        .policy
        .or_else(|| config.as_ref().map(ConfigFile::policy))
        .unwrap_or_default();

    debug!(commands = commands.len(), concurrency_limit, ?policy, "resolved run plan");

    Ok(RunPlan {
        commands,
        concurrency_limit,
        policy,
    })
}

fn load_config(args: &CliArgs) -> Result<Option<ConfigFile>> {
    if let Some(path) = &args.config {
        return load_and_validate(path).map(Some);
    }

    let implicit = default_config_path();
    if implicit.is_file() {
        debug!(path = ?implicit, "using config file from working directory");
        return load_and_validate(implicit).map(Some);
    }

    Ok(None)
}

/// Read a commands file: one command per line.
pub fn read_commands_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_commands(&contents))
}

/// Keep non-blank lines that are not `#` comments, trimmed.
pub fn parse_commands(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
