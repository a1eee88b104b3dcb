// src/exec/supervisor.rs

//! Per-job supervision.
//!
//! A supervisor owns one spawned process. It drains stdout inline and stderr
//! on a separate drainer task, observes the exit (or kills the process when
//! the controller asks), and only concludes the job once both streams are
//! fully drained. Concluding means updating the failure tally, logging the
//! exit line and releasing the job's gate slot.

use std::io;
use std::sync::Arc;

use tokio::process::{Child, ChildStdout};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

use crate::engine::{AdmissionGate, FailureTally, JobExit, JobIndex, KillSignal};
use crate::exec::drain::{drain_lines, spawn_stderr_drainer};
use crate::sink::{Severity, SharedSink};

/// Everything a supervisor needs to run one job to completion.
pub struct Supervisor {
    index: JobIndex,
    child: Child,
    kill: KillSignal,
    exit_tx: oneshot::Sender<JobExit>,
    gate: Arc<AdmissionGate>,
    tally: Arc<FailureTally>,
    sink: SharedSink,
}

/// Releases the job's gate slot when dropped, so a panicking supervisor can
/// not leak a slot and stall admission.
struct Slot {
    gate: Arc<AdmissionGate>,
    index: JobIndex,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.gate.release(self.index);
    }
}

impl Supervisor {
    pub fn new(
        index: JobIndex,
        child: Child,
        kill: KillSignal,
        exit_tx: oneshot::Sender<JobExit>,
        gate: Arc<AdmissionGate>,
        tally: Arc<FailureTally>,
        sink: SharedSink,
    ) -> Self {
        Self {
            index,
            child,
            kill,
            exit_tx,
            gate,
            tally,
            sink,
        }
    }

    /// Run the supervisor on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        let span = info_span!("job", index = self.index);
        tokio::spawn(self.supervise().instrument(span))
    }

    async fn supervise(self) {
        let Supervisor {
            index,
            mut child,
            kill,
            exit_tx,
            gate,
            tally,
            sink,
        } = self;
        let slot = Slot { gate, index };

        let stderr_drainer = child
            .stderr
            .take()
            .map(|stderr| spawn_stderr_drainer(index, stderr, sink.clone()));
        let stdout = child.stdout.take();

        let (drained, exit) = tokio::join!(
            drain_stdout(stdout, &sink),
            observe_exit(&mut child, kill, exit_tx),
        );

        if let Err(err) = drained {
            warn!(job = index, error = %err, "stdout read failed");
            sink.error(&format!("Process handler failed: {err}"));
        }

        // Both streams must be fully drained before the job concludes.
        if let Some(drainer) = stderr_drainer {
            if let Err(err) = drainer.await {
                sink.error(&format!("Process handler failed: stderr drainer {err}"));
            }
        }

        match exit {
            Ok(exit) => conclude(index, exit, &tally, &sink),
            Err(err) => {
                warn!(job = index, error = %err, "could not observe process exit");
                sink.error(&format!("Process handler failed: {err}"));
            }
        }

        drop(slot);
    }
}

async fn drain_stdout(stdout: Option<ChildStdout>, sink: &SharedSink) -> io::Result<usize> {
    match stdout {
        Some(stdout) => drain_lines(stdout, Severity::Info, sink.as_ref()).await,
        None => Ok(0),
    }
}

/// Wait for the process to exit and publish the result to the controller as
/// soon as it is known.
///
/// On error the exit sender is dropped unsent, which the controller reads as
/// "status unavailable".
async fn observe_exit(
    child: &mut Child,
    kill: KillSignal,
    exit_tx: oneshot::Sender<JobExit>,
) -> io::Result<JobExit> {
    let exit = wait_or_kill(child, kill).await?;
    // The controller may have stopped listening after an abort.
    let _ = exit_tx.send(exit);
    Ok(exit)
}

async fn wait_or_kill(child: &mut Child, mut kill: KillSignal) -> io::Result<JobExit> {
    tokio::select! {
        status = child.wait() => Ok(JobExit::from(status?)),

        // A dropped kill switch disables this branch; only an explicit
        // request terminates the process.
        Ok(()) = &mut kill => {
            debug!("termination requested; killing process");
            if let Err(err) = child.kill().await {
                warn!(error = %err, "failed to kill process");
            }
            Ok(JobExit::from(child.wait().await?))
        }
    }
}

fn conclude(index: JobIndex, exit: JobExit, tally: &FailureTally, sink: &SharedSink) {
    let code = exit.code();
    if !exit.success() {
        let failed = tally.record_failure();
        debug!(job = index, exit_code = code, failed, "job failed");
    }
    sink.info(&format!("Job {index}: exit value => {code}"));
}
