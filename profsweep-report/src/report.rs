//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current report schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata.
    pub meta: ReportMeta,
    /// Per-item results in discovery order, skips included.
    pub items: Vec<ItemReport>,
    /// Aggregate counters.
    pub summary: SummaryReport,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version.
    pub schema_version: u32,
    /// Harness version.
    pub version: String,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Program under test.
    pub program: String,
    /// Corpus search root.
    pub root: String,
    /// Ledger file path.
    pub ledger: String,
    /// Profiler settings, when profiling was enabled.
    pub profiler: Option<ProfilerMeta>,
}

/// Profiling wrapper settings echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerMeta {
    /// Wrapper executable.
    pub command: String,
    /// Tool name.
    pub tool: String,
    /// Artifact output directory.
    pub output_dir: String,
}

/// Status of one corpus item as seen by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemReportStatus {
    /// Executed, exit status 0.
    Success,
    /// Executed, nonzero exit status.
    Failed,
    /// The process could not be started.
    LaunchError,
    /// Unexpected supervision failure.
    InternalError,
    /// Not re-run; a ledger record already existed.
    Skipped,
}

/// One corpus item in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    /// 1-based position in discovery order.
    pub sequence: u64,
    /// Root-relative identifier.
    pub item_id: String,
    /// Outcome this run.
    pub status: ItemReportStatus,
    /// Exit code, when the process ran this run.
    pub exit_code: Option<i32>,
    /// Duration in seconds: this run's measurement, or for skipped items
    /// the duration their ledger record carried.
    pub duration_seconds: f64,
    /// Profiler artifact path, when one was assigned.
    pub artifact_path: Option<String>,
}

/// Aggregate counters and durations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Items discovered.
    pub found: usize,
    /// Items skipped via resume state.
    pub skipped: usize,
    /// Items executed this run.
    pub attempted: usize,
    /// Executed items that succeeded.
    pub succeeded: usize,
    /// Executed items that failed.
    pub failed: usize,
    /// Seconds spent executing this run.
    pub run_duration_seconds: f64,
    /// Seconds recorded in the ledger before this run.
    pub prior_duration_seconds: f64,
    /// Prior plus this run.
    pub cumulative_duration_seconds: f64,
}
