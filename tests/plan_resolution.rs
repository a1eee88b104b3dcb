// tests/plan_resolution.rs

use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use multiproc::cli::CliArgs;
use multiproc::plan;
use multiproc::types::CompletionPolicy;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["multiproc"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).unwrap()
}

#[test]
fn commands_are_concatenated_config_file_then_positional() {
    let config = temp_file("[[job]]\ncmd = \"echo config\"\n");
    let commands = temp_file("# header\necho file\n\n");
    let config_path = config.path().to_str().unwrap();
    let commands_path = commands.path().to_str().unwrap();

    let plan = plan::resolve(&args(&[
        "--config",
        config_path,
        "--commands-file",
        commands_path,
        "echo positional",
    ]))
    .unwrap();

    assert_eq!(
        plan.commands,
        vec!["echo config", "echo file", "echo positional"]
    );
}

#[test]
fn flags_override_config_values() {
    let config = temp_file("[config]\nconcurrency_limit = 7\npolicy = \"run_all\"\n");
    let config_path = config.path().to_str().unwrap();

    let plan = plan::resolve(&args(&[
        "--config",
        config_path,
        "-j",
        "2",
        "--policy",
        "fail-fast",
    ]))
    .unwrap();

    assert_eq!(plan.concurrency_limit, 2);
    assert_eq!(plan.policy, CompletionPolicy::FailFast);
}

#[test]
fn config_values_apply_without_flags() {
    let config = temp_file("[config]\nconcurrency_limit = 7\npolicy = \"run_all\"\n");
    let config_path = config.path().to_str().unwrap();

    let plan = plan::resolve(&args(&["--config", config_path, "true"])).unwrap();

    assert_eq!(plan.concurrency_limit, 7);
    assert_eq!(plan.policy, CompletionPolicy::RunAll);
    assert_eq!(plan.commands, vec!["true"]);
}

#[test]
fn missing_commands_file_is_an_error() {
    let result = plan::resolve(&args(&["--commands-file", "/no/such/commands.txt"]));

    assert!(result.is_err());
}
