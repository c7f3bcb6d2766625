//! Subprocess execution
//!
//! Runs the program under test (optionally inside a profiling wrapper)
//! against one work item, with all standard streams discarded, and
//! classifies the outcome. Execution blocks until the child exits: there
//! is no timeout, so a hung program stalls the whole sweep and the
//! operator terminates the harness and resumes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome classification for one processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// The process exited with status 0.
    Success,
    /// The process exited with a nonzero status (or died to a signal).
    Failed,
    /// The process could not be started at all (missing binary,
    /// permission denied, profiler not installed).
    LaunchError,
    /// Any other unexpected failure while supervising the process.
    InternalError,
}

impl ItemStatus {
    /// Whether this status counts as a success in the run summary.
    pub fn is_success(self) -> bool {
        matches!(self, ItemStatus::Success)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemStatus::Success => "success",
            ItemStatus::Failed => "failed",
            ItemStatus::LaunchError => "launch-error",
            ItemStatus::InternalError => "internal-error",
        };
        f.write_str(s)
    }
}

/// Profiling wrapper settings.
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Wrapper executable, e.g. `valgrind`.
    pub command: String,
    /// Tool name passed as `--tool=<name>`.
    pub tool: String,
    /// Directory artifacts are written into.
    pub output_dir: PathBuf,
    /// Artifact file extension (without the leading dot).
    pub artifact_extension: String,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            command: "valgrind".to_string(),
            tool: "callgrind".to_string(),
            output_dir: PathBuf::from("callgrind_output"),
            artifact_extension: "callgrind".to_string(),
        }
    }
}

/// Result of supervising one child process to completion.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    /// Outcome classification.
    pub status: ItemStatus,
    /// Exit code when the process ran; absent when it never launched. On
    /// Unix a signal-terminated child reports the negated signal number.
    pub exit_code: Option<i32>,
    /// Wall-clock time from just before launch to process exit.
    pub duration: Duration,
}

/// Run `program <item_path>`, or the profiled form
/// `profiler --tool=<tool> --callgrind-out-file=<artifact> program <item_path>`,
/// and classify the result.
///
/// Standard streams are discarded; the harness does not read program
/// output. The artifact file, if any, is written by the profiler itself
/// and is not verified here.
pub fn run_item(
    program: &Path,
    item_path: &Path,
    profiler: Option<(&ProfilerConfig, &Path)>,
) -> ExecOutcome {
    let mut command = match profiler {
        Some((profiler, artifact)) => {
            let mut c = Command::new(&profiler.command);
            c.arg(format!("--tool={}", profiler.tool))
                .arg(format!("--callgrind-out-file={}", artifact.display()))
                .arg(program)
                .arg(item_path);
            c
        }
        None => {
            let mut c = Command::new(program);
            c.arg(item_path);
            c
        }
    };
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    debug!(?command, "launching");
    let start = Instant::now();
    match command.status() {
        Ok(status) => {
            let duration = start.elapsed();
            if status.success() {
                ExecOutcome {
                    status: ItemStatus::Success,
                    exit_code: Some(0),
                    duration,
                }
            } else if let Some(code) = status.code() {
                ExecOutcome {
                    status: ItemStatus::Failed,
                    exit_code: Some(code),
                    duration,
                }
            } else {
                match signal_exit_code(status) {
                    Some(code) => ExecOutcome {
                        status: ItemStatus::Failed,
                        exit_code: Some(code),
                        duration,
                    },
                    None => ExecOutcome {
                        status: ItemStatus::InternalError,
                        exit_code: None,
                        duration,
                    },
                }
            }
        }
        Err(error) => {
            let duration = start.elapsed();
            let status = match error.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ItemStatus::LaunchError,
                _ => ItemStatus::InternalError,
            };
            debug!(%error, "launch failed");
            ExecOutcome {
                status,
                exit_code: None,
                duration,
            }
        }
    }
}

/// Map death-by-signal to a negative exit code, like `subprocess` does.
#[cfg(unix)]
fn signal_exit_code(status: std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|signal| -signal)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: std::process::ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_script(dir.path(), "ok.sh", "exit 0");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let outcome = run_item(&program, &item, None);
        assert_eq!(outcome.status, ItemStatus::Success);
        assert_eq!(outcome.exit_code, Some(0));
    }

    #[test]
    fn nonzero_exit_is_failed_with_code() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_script(dir.path(), "fail.sh", "exit 7");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let outcome = run_item(&program, &item, None);
        assert_eq!(outcome.status, ItemStatus::Failed);
        assert_eq!(outcome.exit_code, Some(7));
    }

    #[test]
    fn missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("does-not-exist");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let outcome = run_item(&program, &item, None);
        assert_eq!(outcome.status, ItemStatus::LaunchError);
        assert_eq!(outcome.exit_code, None);
    }

    #[test]
    fn missing_profiler_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_script(dir.path(), "ok.sh", "exit 0");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let profiler = ProfilerConfig {
            command: dir
                .path()
                .join("no-such-profiler")
                .to_string_lossy()
                .into_owned(),
            ..ProfilerConfig::default()
        };
        let artifact = dir.path().join("input.sif.callgrind");
        let outcome = run_item(&program, &item, Some((&profiler, &artifact)));
        assert_eq!(outcome.status, ItemStatus::LaunchError);
        assert_eq!(outcome.exit_code, None);
    }

    #[test]
    fn profiler_receives_program_and_item() {
        let dir = tempfile::tempdir().unwrap();
        // Fake profiler: record its argv, then run the wrapped program.
        let argv_log = dir.path().join("argv.txt");
        let profiler_script = write_script(
            dir.path(),
            "fake-valgrind.sh",
            &format!("echo \"$@\" > {}\nexec \"$3\" \"$4\"", argv_log.display()),
        );
        let program = write_script(dir.path(), "ok.sh", "exit 0");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let profiler = ProfilerConfig {
            command: profiler_script.to_string_lossy().into_owned(),
            ..ProfilerConfig::default()
        };
        let artifact = dir.path().join("input.sif.callgrind");
        let outcome = run_item(&program, &item, Some((&profiler, &artifact)));
        assert_eq!(outcome.status, ItemStatus::Success);

        let argv = fs::read_to_string(&argv_log).unwrap();
        assert!(argv.contains("--tool=callgrind"));
        assert!(argv.contains(&format!("--callgrind-out-file={}", artifact.display())));
    }

    #[test]
    fn duration_is_measured() {
        let dir = tempfile::tempdir().unwrap();
        let program = write_script(dir.path(), "sleepy.sh", "sleep 0.1");
        let item = dir.path().join("input.sif");
        fs::write(&item, "").unwrap();

        let outcome = run_item(&program, &item, None);
        assert_eq!(outcome.status, ItemStatus::Success);
        assert!(outcome.duration >= Duration::from_millis(50));
    }
}
