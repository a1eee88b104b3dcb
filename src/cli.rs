// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::CompletionPolicy;

/// Command-line arguments for `multiproc`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "multiproc",
    version,
    about = "Run commands in parallel under a concurrency limit.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// If omitted, `Multiproc.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File with one command per line (blank lines and `#` comments skipped).
    #[arg(long, value_name = "PATH")]
    pub commands_file: Option<PathBuf>,

    /// Maximum number of commands running at the same time.
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Completion policy; overrides `[config].policy`.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<CompletionPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MULTIPROC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved commands and settings, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Commands to run, each a single argument (e.g. "sleep 1").
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_overrides() {
        let args = CliArgs::try_parse_from([
            "multiproc",
            "-j",
            "3",
            "--policy",
            "run-all",
            "sleep 1",
            "echo hi",
        ])
        .unwrap();

        assert_eq!(args.jobs, Some(3));
        assert_eq!(args.policy, Some(CompletionPolicy::RunAll));
        assert_eq!(args.commands, vec!["sleep 1", "echo hi"]);
        assert!(!args.dry_run);
    }

    #[test]
    fn zero_jobs_is_rejected() {
        assert!(CliArgs::try_parse_from(["multiproc", "--jobs", "0", "true"]).is_err());
    }
}
