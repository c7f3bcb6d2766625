//! Batch orchestration
//!
//! Ties discovery, resume state, naming, and execution together into a
//! single sequential sweep. One child process is in flight at a time, and
//! each finished item is appended to the ledger before the next one
//! starts, so an interrupted run can always resume from the ledger. A
//! killed run leaves at most one item without a record; that item is
//! simply re-attempted next time.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::corpus::{self, CorpusError, WorkItem};
use crate::exec::{self, ExecOutcome, ItemStatus, ProfilerConfig};
use crate::ledger::{Ledger, LedgerError, LedgerRecord};
use crate::naming::NamingTable;

/// Configuration for one sweep run. Everything the orchestrator needs is
/// passed in here; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// The program under test.
    pub program: PathBuf,
    /// The corpus search root.
    pub root: PathBuf,
    /// The ledger file.
    pub ledger_path: PathBuf,
    /// Work-item file-name suffix, e.g. `.sif`.
    pub suffix: String,
    /// Profiling wrapper; `None` runs the program directly.
    pub profiler: Option<ProfilerConfig>,
}

/// Fatal setup errors: reported once, before any item is processed.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The program path does not exist.
    #[error("program not found: {0}")]
    ProgramNotFound(PathBuf),

    /// The program path exists but is not a regular file.
    #[error("program path is not a regular file: {0}")]
    ProgramNotAFile(PathBuf),

    /// The program file is not executable.
    #[error("program is not executable: {0}")]
    ProgramNotExecutable(PathBuf),

    /// The corpus root is unusable.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// The profiler output directory could not be created.
    #[error("failed to create profiler output directory {path}: {source}")]
    ProfilerOutputDir {
        /// The configured output directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The ledger exists but cannot be read.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What happened to one corpus item during this run.
#[derive(Debug, Clone)]
pub enum ItemDisposition {
    /// A ledger record already existed; the item was not re-run.
    Skipped {
        /// The duration its ledger record carried.
        prior_duration_seconds: f64,
    },
    /// The item was executed this run.
    Executed {
        /// Outcome classification.
        status: ItemStatus,
        /// Exit code, when the process ran.
        exit_code: Option<i32>,
        /// Wall-clock duration in seconds.
        duration_seconds: f64,
        /// Profiler artifact path, when profiling was enabled.
        artifact_path: Option<String>,
    },
}

/// Per-item result observed during this run, skips included.
#[derive(Debug, Clone)]
pub struct ItemResult {
    /// 1-based position in discovery order.
    pub sequence: u64,
    /// Work-item identifier.
    pub item_id: String,
    /// Skip or execution outcome.
    pub disposition: ItemDisposition,
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Items discovered in the corpus.
    pub found: usize,
    /// Items skipped because a ledger record existed.
    pub skipped: usize,
    /// Items executed this run.
    pub attempted: usize,
    /// Executed items that exited 0.
    pub succeeded: usize,
    /// Executed items that failed (nonzero exit, launch error, or
    /// internal error).
    pub failed: usize,
    /// Sum of durations executed this run, in seconds.
    pub run_duration_seconds: f64,
    /// Sum of durations recorded in the ledger before this run.
    pub prior_duration_seconds: f64,
}

impl RunSummary {
    /// Prior recorded durations plus this run's durations.
    pub fn cumulative_duration_seconds(&self) -> f64 {
        self.prior_duration_seconds + self.run_duration_seconds
    }
}

/// Everything a completed sweep reports back.
#[derive(Debug)]
pub struct RunOutcome {
    /// Aggregate counters.
    pub summary: RunSummary,
    /// Per-item results in discovery order.
    pub items: Vec<ItemResult>,
}

/// Progress callbacks, invoked at the per-item boundary. The engine does
/// no terminal I/O; a CLI front end renders these however it likes.
pub trait SweepObserver {
    /// An item was skipped because the ledger already records it.
    fn item_skipped(&mut self, _sequence: u64, _total: usize, _item: &WorkItem, _prior: f64) {}

    /// An item is about to be executed.
    fn item_started(&mut self, _sequence: u64, _total: usize, _item: &WorkItem) {}

    /// An item's child process exited.
    fn item_finished(
        &mut self,
        _sequence: u64,
        _total: usize,
        _item: &WorkItem,
        _outcome: &ExecOutcome,
    ) {
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SweepObserver for NullObserver {}

/// The sequential batch orchestrator.
#[derive(Debug)]
pub struct Orchestrator {
    config: SweepConfig,
}

impl Orchestrator {
    /// An orchestrator for `config`.
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Run the sweep to completion.
    ///
    /// Per-item failures are recorded and never abort the batch; only
    /// setup problems (bad program, bad root, unreadable ledger,
    /// uncreatable profiler output directory) return an error. Ledger
    /// append failures are logged and the run continues; a dropped
    /// record just means the item is re-attempted on the next resume.
    pub fn run(&self, observer: &mut dyn SweepObserver) -> Result<RunOutcome, SetupError> {
        let program = self.validate_program()?;
        let corpus = corpus::discover(&self.config.root, &self.config.suffix)?;

        if let Some(profiler) = &self.config.profiler {
            fs::create_dir_all(&profiler.output_dir).map_err(|source| {
                SetupError::ProfilerOutputDir {
                    path: profiler.output_dir.clone(),
                    source,
                }
            })?;
        }

        let ledger = Ledger::new(&self.config.ledger_path);
        let resume = ledger.load()?;
        let naming = NamingTable::build(&corpus);

        let total = corpus.len();
        let mut summary = RunSummary {
            found: total,
            prior_duration_seconds: resume.total_recorded_duration(),
            ..RunSummary::default()
        };
        let mut items = Vec::with_capacity(total);

        for (index, item) in corpus.items().iter().enumerate() {
            let sequence = index as u64 + 1;

            if resume.is_processed(item.id()) {
                let prior = resume.prior_duration(item.id()).unwrap_or(0.0);
                observer.item_skipped(sequence, total, item, prior);
                summary.skipped += 1;
                items.push(ItemResult {
                    sequence,
                    item_id: item.id().to_string(),
                    disposition: ItemDisposition::Skipped {
                        prior_duration_seconds: prior,
                    },
                });
                continue;
            }

            let artifact = self.config.profiler.as_ref().map(|profiler| {
                profiler
                    .output_dir
                    .join(naming.artifact_name(sequence, item, &profiler.artifact_extension))
            });

            observer.item_started(sequence, total, item);
            let item_path = item.absolute_in(corpus.root());
            let profiled = match (&self.config.profiler, &artifact) {
                (Some(profiler), Some(artifact)) => Some((profiler, artifact.as_path())),
                _ => None,
            };
            let outcome = exec::run_item(&program, &item_path, profiled);
            observer.item_finished(sequence, total, item, &outcome);

            let duration_seconds = outcome.duration.as_secs_f64();
            summary.attempted += 1;
            if outcome.status.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            summary.run_duration_seconds += duration_seconds;

            // An artifact path only makes sense when the wrapper actually
            // launched; a launch error produced nothing.
            let artifact_path = match outcome.status {
                ItemStatus::LaunchError => None,
                _ => artifact.as_ref().map(|p| p.to_string_lossy().into_owned()),
            };

            let record = LedgerRecord {
                sequence,
                item_id: item.id().to_string(),
                status: outcome.status,
                exit_code: outcome.exit_code,
                duration_seconds,
                artifact_path: artifact_path.clone(),
            };
            if let Err(append_error) = ledger.append(&record) {
                error!(
                    item = item.id(),
                    %append_error,
                    "failed to append ledger record; the item will be re-attempted on the next resume"
                );
            }

            items.push(ItemResult {
                sequence,
                item_id: item.id().to_string(),
                disposition: ItemDisposition::Executed {
                    status: outcome.status,
                    exit_code: outcome.exit_code,
                    duration_seconds,
                    artifact_path,
                },
            });
        }

        info!(
            found = summary.found,
            skipped = summary.skipped,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "sweep complete"
        );
        Ok(RunOutcome { summary, items })
    }

    /// Check that the program exists, is a regular file, and is
    /// executable, then resolve it to an absolute path once so items can
    /// be launched from any working directory.
    fn validate_program(&self) -> Result<PathBuf, SetupError> {
        let path = &self.config.program;
        let metadata =
            fs::metadata(path).map_err(|_| SetupError::ProgramNotFound(path.clone()))?;
        if !metadata.is_file() {
            return Err(SetupError::ProgramNotAFile(path.clone()));
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(SetupError::ProgramNotExecutable(path.clone()));
            }
        }
        fs::canonicalize(path).map_err(|_| SetupError::ProgramNotFound(path.clone()))
    }
}
