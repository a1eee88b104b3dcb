// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands, using
//! `tokio::process::Command`, and reporting each job's outcome back to the
//! controller.
//!
//! - [`command`] tokenizes command strings and spawns piped processes.
//! - [`drain`] forwards stdout/stderr lines into the log sink.
//! - [`supervisor`] owns one process from spawn until its slot is released.

pub mod command;
pub mod drain;
pub mod supervisor;

pub use command::{spawn, CommandLine};
pub use supervisor::Supervisor;
