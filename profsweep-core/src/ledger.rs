//! Result ledger
//!
//! Append-only CSV of per-item outcomes, doubling as resume state. Any
//! row for an item id marks that item processed, whatever outcome the row
//! records. Reads are defensive: a malformed ledger degrades to "nothing
//! resumable" with a warning instead of aborting the run, because the
//! ledger's job is to help resumption, not gate it.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::exec::ItemStatus;

/// Errors raised by ledger I/O. Parse-level problems are not errors; they
/// degrade with warnings inside [`Ledger::load`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file exists but could not be opened for reading.
    #[error("failed to open ledger {path}: {source}")]
    Open {
        /// The ledger path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be written or flushed.
    #[error("failed to append to ledger {path}: {source}")]
    Append {
        /// The ledger path.
        path: PathBuf,
        /// Underlying CSV/I/O error.
        source: csv::Error,
    },
}

/// One persisted row: a single processed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// The item's 1-based position in discovery order of the run's corpus.
    pub sequence: u64,
    /// Root-relative work-item identifier.
    pub item_id: String,
    /// Outcome classification.
    pub status: ItemStatus,
    /// Exit code; blank when the process never launched.
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the attempt in seconds.
    pub duration_seconds: f64,
    /// Profiler artifact path; blank when profiling was disabled or the
    /// process never launched.
    pub artifact_path: Option<String>,
}

/// Resume state computed from a full ledger scan: every recorded item id
/// mapped to its last recorded duration.
#[derive(Debug, Default)]
pub struct ResumeState {
    durations: HashMap<String, f64>,
}

impl ResumeState {
    /// Whether a record for `item_id` exists.
    pub fn is_processed(&self, item_id: &str) -> bool {
        self.durations.contains_key(item_id)
    }

    /// The last recorded duration for `item_id`, if any.
    pub fn prior_duration(&self, item_id: &str) -> Option<f64> {
        self.durations.get(item_id).copied()
    }

    /// Sum of all recorded durations.
    pub fn total_recorded_duration(&self) -> f64 {
        self.durations.values().sum()
    }

    /// Number of distinct recorded items.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Whether nothing is resumable.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// The persisted record store. Created empty if absent at run start,
/// opened in append mode, never rewritten or compacted.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// A ledger at `path`. The file is not touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scan all existing records into a [`ResumeState`].
    ///
    /// A missing file yields an empty state. A file without an `item_id`
    /// column yields an empty state with a warning. A missing or
    /// unparsable duration field is stored as 0.0 with a warning. Rows
    /// sharing an `item_id` resolve last-write-wins.
    ///
    /// Only an exists-but-unopenable file is an error: resuming blind past
    /// it would silently redo the whole corpus.
    pub fn load(&self) -> Result<ResumeState, LedgerError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no ledger file, starting fresh");
            return Ok(ResumeState::default());
        }
        let file = File::open(&self.path).map_err(|source| LedgerError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "unreadable ledger header, treating ledger as empty");
                return Ok(ResumeState::default());
            }
        };
        let Some(id_column) = headers.iter().position(|h| h == "item_id") else {
            warn!(path = %self.path.display(), "ledger is missing the item_id column, treating ledger as empty");
            return Ok(ResumeState::default());
        };
        let duration_column = headers.iter().position(|h| h == "duration_seconds");
        if duration_column.is_none() {
            warn!(path = %self.path.display(), "ledger is missing the duration_seconds column, prior durations recorded as 0");
        }

        let mut durations = HashMap::new();
        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(error) => {
                    warn!(row = index + 2, %error, "skipping unparsable ledger row");
                    continue;
                }
            };
            let Some(item_id) = row.get(id_column).filter(|id| !id.is_empty()) else {
                continue;
            };
            let duration = match duration_column.and_then(|c| row.get(c)) {
                Some(field) => field.parse::<f64>().unwrap_or_else(|_| {
                    warn!(row = index + 2, item_id, field, "unparsable duration, recording 0");
                    0.0
                }),
                None => 0.0,
            };
            // Last write wins for duplicated ids.
            durations.insert(item_id.to_string(), duration);
        }

        info!(path = %self.path.display(), entries = durations.len(), "loaded resume state");
        Ok(ResumeState { durations })
    }

    /// Append exactly one record durably.
    ///
    /// The file is opened in append mode per call and flushed before
    /// returning, so a record survives the process being killed right
    /// after. The header row is written only when the file is empty.
    pub fn append(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let is_empty = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LedgerError::Open {
                path: self.path.clone(),
                source,
            })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        writer.serialize(record).map_err(|source| LedgerError::Append {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| LedgerError::Append {
            path: self.path.clone(),
            source: source.into(),
        })?;
        Ok(())
    }
}
