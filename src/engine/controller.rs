// src/engine/controller.rs

//! Batch controller.
//!
//! The controller launches commands strictly in input order, one admission
//! at a time, and implements the two completion policies:
//!
//! - [`Controller::run`]: fail-fast. Once a failure is observed no further
//!   commands are admitted, and launched jobs that are still live get killed.
//! - [`Controller::run_all`]: exhaustive. Every command runs to completion
//!   and its exit code is reported at its input position.
//!
//! Each call works on a fresh gate and tally, so a controller can be reused
//! across batches.

use std::sync::Arc;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::{
    kill_switch, AdmissionGate, FailureTally, JobExit, JobIndex, JobRecord, JobState, KillSignal,
    RunReport,
};
use crate::errors::{MultiprocError, Result};
use crate::exec::{self, Supervisor};
use crate::sink::{SharedSink, TracingSink};

/// Runs batches of commands under a fixed concurrency limit.
pub struct Controller {
    concurrency_limit: usize,
    sink: SharedSink,
}

impl Controller {
    /// `concurrency_limit` is clamped to at least 1.
    pub fn new(concurrency_limit: usize, sink: SharedSink) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
            sink,
        }
    }

    /// Controller that writes job output through `tracing`.
    pub fn with_tracing_sink(concurrency_limit: usize) -> Self {
        Self::new(concurrency_limit, Arc::new(TracingSink))
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Fail-fast run. Returns 0 if every launched job exited 0, otherwise 1.
    pub async fn run<S: AsRef<str>>(&self, commands: &[S]) -> i32 {
        self.run_with_report(commands).await.status
    }

    /// Fail-fast run returning the per-job records alongside the status.
    pub async fn run_with_report<S: AsRef<str>>(&self, commands: &[S]) -> RunReport {
        let batch = Batch::new(self.concurrency_limit, self.sink.clone());
        let mut jobs: Vec<JobRecord> = commands
            .iter()
            .enumerate()
            .map(|(pos, cmd)| JobRecord::pending(pos + 1, cmd.as_ref()))
            .collect();
        let mut launched = Vec::with_capacity(jobs.len());

        let status = match fail_fast(&batch, &mut jobs, &mut launched).await {
            Ok(status) => status,
            Err(err) => {
                batch.abort(&err, &mut launched).await;
                for job in launched.iter_mut() {
                    let record = &mut jobs[job.index - 1];
                    settle_after_abort(job, record);
                }
                1
            }
        };

        info!(
            status,
            jobs = jobs.len(),
            failed = batch.tally.count(),
            "fail-fast batch finished"
        );

        RunReport {
            status,
            jobs,
            peak_running: batch.gate.peak(),
            blocked_admissions: batch.gate.blocked_admissions(),
        }
    }

    /// Exhaustive run. Returns one exit code per command, in input order.
    ///
    /// Non-zero exit codes are part of the result, not an error. Only a job
    /// that could not be launched or whose exit could not be observed aborts
    /// the batch; every job still live at that point is terminated and
    /// reaped before the error is returned.
    pub async fn run_all<S: AsRef<str>>(&self, commands: &[S]) -> Result<Vec<i32>> {
        let batch = Batch::new(self.concurrency_limit, self.sink.clone());
        let mut launched = Vec::with_capacity(commands.len());

        match exhaustive(&batch, commands, &mut launched).await {
            Ok(codes) => {
                info!(
                    jobs = codes.len(),
                    failed = batch.tally.count(),
                    "exhaustive batch finished"
                );
                Ok(codes)
            }
            Err(err) => {
                batch.abort(&err, &mut launched).await;
                Err(err)
            }
        }
    }
}

/// Shared state for one call to `run` or `run_all`.
struct Batch {
    gate: Arc<AdmissionGate>,
    tally: Arc<FailureTally>,
    sink: SharedSink,
}

/// A job whose process was spawned and handed to a supervisor.
struct LaunchedJob {
    index: JobIndex,
    exit_rx: oneshot::Receiver<JobExit>,
    /// `None` once the supervisor has been joined.
    supervisor: Option<JoinHandle<()>>,
}

impl Batch {
    fn new(limit: usize, sink: SharedSink) -> Self {
        Self {
            gate: Arc::new(AdmissionGate::new(limit)),
            tally: Arc::new(FailureTally::new()),
            sink,
        }
    }

    /// Wait for a slot for job `index`; returns the supervisor's half of the
    /// job's kill switch.
    async fn admit(&self, index: JobIndex) -> KillSignal {
        let (kill, signal) = kill_switch();
        self.gate.acquire(index, kill).await;
        signal
    }

    /// Spawn an admitted job and its supervisor. On failure the admission
    /// is withdrawn.
    fn start(&self, index: JobIndex, command: &str, kill: KillSignal) -> Result<LaunchedJob> {
        let child = match exec::spawn(index, command) {
            Ok(child) => child,
            Err(err) => {
                self.gate.release(index);
                return Err(err);
            }
        };

        self.sink.info(&format!("Running job {index}: {command}"));

        let (exit_tx, exit_rx) = oneshot::channel();
        let supervisor = Supervisor::new(
            index,
            child,
            kill,
            exit_tx,
            self.gate.clone(),
            self.tally.clone(),
            self.sink.clone(),
        )
        .spawn();

        Ok(LaunchedJob {
            index,
            exit_rx,
            supervisor: Some(supervisor),
        })
    }

    /// Cleanup after an unrecoverable error: kill every live job, then wait
    /// for all supervisors so the processes are reaped and their output is
    /// logged before the batch returns.
    async fn abort(&self, err: &MultiprocError, launched: &mut [LaunchedJob]) {
        error!(error = %err, "parallel processing failed; terminating live jobs");
        self.sink.error(&format!("Parallel processing failed: {err}"));
        let terminated = self.gate.terminate_all();
        debug!(terminated, "termination requested for live jobs");

        for job in launched.iter_mut() {
            if let Err(err) = job.join().await {
                warn!(job = job.index, error = %err, "supervisor did not finish cleanly");
            }
        }
    }
}

impl LaunchedJob {
    /// Non-blocking exit query: `None` while the process is still live.
    fn try_exit(&mut self) -> Result<Option<JobExit>> {
        match self.exit_rx.try_recv() {
            Ok(exit) => Ok(Some(exit)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(MultiprocError::StatusUnavailable { index: self.index }),
        }
    }

    async fn wait_exit(&mut self) -> Result<JobExit> {
        (&mut self.exit_rx)
            .await
            .map_err(|_| MultiprocError::StatusUnavailable { index: self.index })
    }

    /// Wait for the supervisor, i.e. until all of the job's output is logged.
    /// Joining twice is a no-op.
    async fn join(&mut self) -> Result<()> {
        let Some(supervisor) = self.supervisor.take() else {
            return Ok(());
        };
        supervisor
            .await
            .map_err(|err| MultiprocError::SupervisorFailed {
                index: self.index,
                reason: err.to_string(),
            })
    }
}

/// Record how a launched job ended once an abort has reaped it.
fn settle_after_abort(job: &mut LaunchedJob, record: &mut JobRecord) {
    if record.state != JobState::Running {
        return;
    }
    if let Ok(Some(exit)) = job.try_exit() {
        record.state = match exit {
            JobExit::Signal => JobState::ForciblyTerminated,
            other => other.into(),
        };
    }
}

async fn fail_fast(
    batch: &Batch,
    jobs: &mut [JobRecord],
    launched: &mut Vec<LaunchedJob>,
) -> Result<i32> {
    for pos in 0..jobs.len() {
        let index = pos + 1;
        let kill = batch.admit(index).await;

        if batch.tally.any() {
            batch.gate.release(index);
            info!(
                job = index,
                remaining = jobs.len() - pos,
                "failure observed; not launching remaining commands"
            );
            break;
        }

        jobs[pos].state = JobState::Admitted;
        let job = batch.start(index, &jobs[pos].command, kill)?;
        jobs[pos].state = JobState::Running;
        launched.push(job);
    }

    let mut failed = false;
    for job in launched.iter_mut() {
        let record = &mut jobs[job.index - 1];
        failed = failed || batch.tally.any();

        if failed {
            match job.try_exit()? {
                Some(exit) => record.state = exit.into(),
                None => {
                    batch.gate.terminate(job.index);
                    batch.sink.info(&format!("Job {}: terminated.", job.index));
                    record.state = JobState::ForciblyTerminated;
                }
            }
        } else {
            let exit = job.wait_exit().await?;
            record.state = exit.into();
            failed = !exit.success();
        }
    }

    for job in launched.iter_mut() {
        job.join().await?;
    }

    Ok(if failed { 1 } else { 0 })
}

async fn exhaustive<S: AsRef<str>>(
    batch: &Batch,
    commands: &[S],
    launched: &mut Vec<LaunchedJob>,
) -> Result<Vec<i32>> {
    for (pos, command) in commands.iter().enumerate() {
        let index = pos + 1;
        let kill = batch.admit(index).await;
        launched.push(batch.start(index, command.as_ref(), kill)?);
    }

    let mut codes = Vec::with_capacity(launched.len());
    for job in launched.iter_mut() {
        codes.push(job.wait_exit().await?.code());
    }

    for job in launched.iter_mut() {
        job.join().await?;
    }

    Ok(codes)
}
