// src/exec/drain.rs

//! Stream drainers: read a child's output to end-of-input and forward each
//! line to the log sink.
//!
//! Output is read as bytes and decoded lossily, so non-UTF-8 output never
//! turns into a read error.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

use crate::engine::JobIndex;
use crate::sink::{LogSink, Severity, SharedSink};

/// Forward every line of `stream` to `sink` at `severity`.
///
/// Returns the number of lines forwarded once end-of-input is reached.
pub async fn drain_lines<R>(stream: R, severity: Severity, sink: &dyn LogSink) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut lines = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(lines);
        }

        let line = String::from_utf8_lossy(strip_line_ending(&buf));
        sink.write(severity, &line);
        lines += 1;
    }
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// Drain a job's stderr on its own task at error severity.
///
/// A read failure is logged once and ends the drainer; it never counts as a
/// job failure.
pub fn spawn_stderr_drainer(index: JobIndex, stderr: ChildStderr, sink: SharedSink) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match drain_lines(stderr, Severity::Error, sink.as_ref()).await {
                Ok(lines) => debug!(job = index, lines, "stderr drained"),
                Err(err) => {
                    warn!(job = index, error = %err, "stderr read failed");
                    sink.error(&format!("Error stream handler failed: {err}"));
                }
            }
        }
        .in_current_span(),
    )
}
