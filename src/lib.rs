// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod sink;
pub mod types;

use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::engine::Controller;
use crate::errors::Result;
use crate::exec::CommandLine;
use crate::plan::RunPlan;
use crate::types::CompletionPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config / commands-file / CLI resolution
/// - the controller with a `tracing`-backed log sink
/// - the selected completion policy
///
/// Returns the process exit status for the binary.
pub async fn run(args: CliArgs) -> Result<i32> {
    let plan = plan::resolve(&args)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(0);
    }

    if plan.commands.is_empty() {
        warn!("no commands to run");
    }

    info!(
        commands = plan.commands.len(),
        concurrency_limit = plan.concurrency_limit,
        policy = ?plan.policy,
        "starting batch"
    );

    let controller = Controller::with_tracing_sink(plan.concurrency_limit);

    match plan.policy {
        CompletionPolicy::FailFast => Ok(controller.run(&plan.commands).await),
        CompletionPolicy::RunAll => {
            let codes = controller.run_all(&plan.commands).await?;
            print_exit_codes(&plan.commands, &codes);
            Ok(if codes.iter().all(|&code| code == 0) { 0 } else { 1 })
        }
    }
}

/// One line per job on stdout: `<index>\t<exit code>\t<command>`.
fn print_exit_codes(commands: &[String], codes: &[i32]) {
    for (pos, (command, code)) in commands.iter().zip(codes).enumerate() {
        println!("{}\t{}\t{}", pos + 1, code, command);
    }
}

/// Simple dry-run output: settings plus each command's tokens.
fn print_dry_run(plan: &RunPlan) {
    println!("multiproc dry-run");
    println!("  concurrency_limit = {}", plan.concurrency_limit);
    println!("  policy = {:?}", plan.policy);
    println!();

    println!("jobs ({}):", plan.commands.len());
    for (pos, command) in plan.commands.iter().enumerate() {
        println!("  {}. {command}", pos + 1);
        match CommandLine::parse(command) {
            Some(cmd) => {
                println!("      program: {}", cmd.program);
                if !cmd.args.is_empty() {
                    println!("      args: {:?}", cmd.args);
                }
            }
            None => println!("      (empty command; launching it will fail)"),
        }
    }
}
