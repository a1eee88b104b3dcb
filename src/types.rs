use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Completion policy for a batch of commands.
///
/// - `FailFast`: stop launching new commands once any job has failed, and
///   terminate jobs that are still running (default).
/// - `RunAll`: run every command to completion and report each exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    FailFast,
    RunAll,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::FailFast
    }
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(CompletionPolicy::FailFast),
            "run_all" => Ok(CompletionPolicy::RunAll),
            other => Err(format!(
                "invalid policy: {other} (expected \"fail_fast\" or \"run_all\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_spellings() {
        assert_eq!("fail-fast".parse::<CompletionPolicy>(), Ok(CompletionPolicy::FailFast));
        assert_eq!(" RUN_ALL ".parse::<CompletionPolicy>(), Ok(CompletionPolicy::RunAll));
        assert!("sometimes".parse::<CompletionPolicy>().is_err());
    }
}
