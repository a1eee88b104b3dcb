use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory of shell scripts.
///
/// Commands are split on whitespace without quoting, so anything more
/// involved than `program arg arg` is written to a script and run as
/// `sh <path>`. The directory is removed on drop.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir for scripts"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `body` to `<name>.sh` and return the command that runs it.
    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(format!("{name}.sh"));
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        format!("sh {}", path.display())
    }

    /// Command that exits with `code` after printing one line to each stream.
    pub fn exit_with(&self, name: &str, code: i32) -> String {
        self.script(
            name,
            &format!("echo {name} out\necho {name} err >&2\nexit {code}"),
        )
    }

    /// Command that sleeps `secs` (fractions allowed) and exits with `code`.
    pub fn sleep_then_exit(&self, name: &str, secs: f64, code: i32) -> String {
        self.script(name, &format!("sleep {secs}\nexit {code}"))
    }

    /// Command that appends `start`/`end` markers with its name to a shared
    /// journal file, sleeping `secs` in between.
    pub fn journaled(&self, name: &str, secs: f64) -> String {
        let journal = self.journal_path();
        self.script(
            name,
            &format!(
                "echo start {name} >> {j}\nsleep {secs}\necho end {name} >> {j}",
                j = journal.display()
            ),
        )
    }

    /// Command that records its pid in `<name>.pid`, then becomes a
    /// `sleep secs` with the same pid.
    pub fn pid_then_sleep(&self, name: &str, secs: f64) -> String {
        let pid_file = self.pid_path(name);
        self.script(
            name,
            &format!("echo $$ > {}\nexec sleep {secs}", pid_file.display()),
        )
    }

    /// Pid written by [`ScriptDir::pid_then_sleep`], if the script got that far.
    pub fn recorded_pid(&self, name: &str) -> Option<u32> {
        fs::read_to_string(self.pid_path(name))
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    fn pid_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.pid"))
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.path().join("journal.log")
    }

    /// Lines of the shared journal, empty if nothing was written.
    pub fn journal(&self) -> Vec<String> {
        fs::read_to_string(self.journal_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Most jobs that were between `start` and `end` at the same time,
    /// according to the journal.
    pub fn max_overlap(&self) -> usize {
        let mut live = 0usize;
        let mut peak = 0usize;
        for line in self.journal() {
            if line.starts_with("start ") {
                live += 1;
                peak = peak.max(live);
            } else if line.starts_with("end ") {
                live = live.saturating_sub(1);
            }
        }
        peak
    }
}

impl Default for ScriptDir {
    fn default() -> Self {
        Self::new()
    }
}

/// True while `/proc` still has an entry for `pid`, i.e. the process is
/// running or has not been reaped yet.
#[cfg(target_os = "linux")]
pub fn process_exists(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}
