#![warn(missing_docs)]
//! Profsweep Report - Run Reporting
//!
//! Generates the harness's output formats:
//! - JSON (machine-readable)
//! - Human-readable terminal output
//!
//! The ledger itself is written by the engine; this crate only models and
//! renders the end-of-run report.

mod human;
mod json;
mod report;

pub use human::format_human_output;
pub use json::generate_json_report;
pub use report::{
    ItemReport, ItemReportStatus, ProfilerMeta, Report, ReportMeta, SummaryReport, SCHEMA_VERSION,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
