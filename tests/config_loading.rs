// tests/config_loading.rs

use std::io::Write;

use tempfile::NamedTempFile;

use multiproc::config::{load_and_validate, load_from_path};
use multiproc::errors::MultiprocError;
use multiproc::types::CompletionPolicy;
use multiproc_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = write_config(
        r#"
[config]
concurrency_limit = 3
policy = "run_all"

[[job]]
cmd = "echo one"

[[job]]
cmd = "sleep 1"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.concurrency_limit(), 3);
    assert_eq!(cfg.policy(), CompletionPolicy::RunAll);
    assert_eq!(cfg.commands(), vec!["echo one", "sleep 1"]);
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.policy(), CompletionPolicy::FailFast);
    assert!(cfg.concurrency_limit() >= 1);
    assert!(cfg.jobs().is_empty());
}

#[test]
fn zero_concurrency_limit_returns_config_error() {
    let file = write_config("[config]\nconcurrency_limit = 0\n");

    match load_and_validate(file.path()) {
        Err(MultiprocError::ConfigError(msg)) => assert!(msg.contains("concurrency_limit")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn blank_job_command_returns_config_error() {
    let file = write_config("[[job]]\ncmd = \"true\"\n\n[[job]]\ncmd = \"  \"\n");

    match load_and_validate(file.path()) {
        Err(MultiprocError::ConfigError(msg)) => assert!(msg.contains("#2")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_policy_returns_toml_error() {
    let file = write_config("[config]\npolicy = \"sometimes\"\n");

    assert!(matches!(
        load_from_path(file.path()),
        Err(MultiprocError::TomlError(_))
    ));
}

#[test]
fn missing_file_returns_io_error() {
    let result = load_and_validate("/definitely/not/here/Multiproc.toml");

    assert!(matches!(result, Err(MultiprocError::IoError(_))));
}

#[test]
fn builder_produces_validated_config() {
    let cfg = ConfigFileBuilder::new()
        .with_job("echo a")
        .with_job("echo b")
        .with_concurrency_limit(2)
        .with_policy(CompletionPolicy::RunAll)
        .build();

    assert_eq!(cfg.commands(), vec!["echo a", "echo b"]);
    assert_eq!(cfg.concurrency_limit(), 2);
    assert_eq!(cfg.policy(), CompletionPolicy::RunAll);
}

#[test]
fn builder_output_is_rejected_when_invalid() {
    let raw = ConfigFileBuilder::new().with_concurrency_limit(0).build_raw();

    assert!(multiproc::config::ConfigFile::try_from(raw).is_err());
}
