//! Output Formatting
//!
//! Human-readable terminal rendering of a run report: per-item lines with
//! status icons, then a summary block with counters and cumulative
//! durations.

use crate::report::{ItemReportStatus, Report};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Profsweep Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for item in &report.items {
        let status_icon = match item.status {
            ItemReportStatus::Success => "✓",
            ItemReportStatus::Failed => "✗",
            ItemReportStatus::LaunchError => "💥",
            ItemReportStatus::InternalError => "💥",
            ItemReportStatus::Skipped => "⊘",
        };
        output.push_str(&format!("  {} {}", status_icon, item.item_id));
        match item.status {
            ItemReportStatus::Skipped => {
                output.push_str(&format!(
                    " (skipped, {:.1} s recorded)",
                    item.duration_seconds
                ));
            }
            ItemReportStatus::Success => {
                output.push_str(&format!(" ({:.1} s)", item.duration_seconds));
            }
            ItemReportStatus::Failed => {
                let code = item
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".to_string());
                output.push_str(&format!(" (exit {}, {:.1} s)", code, item.duration_seconds));
            }
            ItemReportStatus::LaunchError => output.push_str(" (could not launch)"),
            ItemReportStatus::InternalError => output.push_str(" (internal error)"),
        }
        if let Some(artifact) = &item.artifact_path {
            output.push_str(&format!("\n      artifact: {}", artifact));
        }
        output.push('\n');
    }

    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Found: {}  Skipped: {}  Attempted: {}  Succeeded: {}  Failed: {}\n",
        report.summary.found,
        report.summary.skipped,
        report.summary.attempted,
        report.summary.succeeded,
        report.summary.failed
    ));
    output.push_str(&format!(
        "  Duration this run: {:.2} s\n",
        report.summary.run_duration_seconds
    ));
    output.push_str(&format!(
        "  Cumulative recorded duration: {:.2} s\n",
        report.summary.cumulative_duration_seconds
    ));
    output.push_str(&format!("  Ledger: {}\n", report.meta.ledger));
    if let Some(profiler) = &report.meta.profiler {
        output.push_str(&format!("  Artifacts: {}\n", profiler.output_dir));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{
        ItemReport, ItemReportStatus, ProfilerMeta, ReportMeta, SummaryReport, SCHEMA_VERSION,
    };

    fn sample_report() -> Report {
        Report {
            meta: ReportMeta {
                schema_version: SCHEMA_VERSION,
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                program: "/usr/bin/render".to_string(),
                root: "/corpus".to_string(),
                ledger: "results.csv".to_string(),
                profiler: Some(ProfilerMeta {
                    command: "valgrind".to_string(),
                    tool: "callgrind".to_string(),
                    output_dir: "callgrind_output".to_string(),
                }),
            },
            items: vec![
                ItemReport {
                    sequence: 1,
                    item_id: "a.sif".to_string(),
                    status: ItemReportStatus::Skipped,
                    exit_code: None,
                    duration_seconds: 4.2,
                    artifact_path: None,
                },
                ItemReport {
                    sequence: 2,
                    item_id: "b.sif".to_string(),
                    status: ItemReportStatus::Failed,
                    exit_code: Some(7),
                    duration_seconds: 0.3,
                    artifact_path: Some("callgrind_output/b.sif.callgrind".to_string()),
                },
            ],
            summary: SummaryReport {
                found: 2,
                skipped: 1,
                attempted: 1,
                succeeded: 0,
                failed: 1,
                run_duration_seconds: 0.3,
                prior_duration_seconds: 4.2,
                cumulative_duration_seconds: 4.5,
            },
        }
    }

    #[test]
    fn summary_counts_and_durations_are_rendered() {
        let output = format_human_output(&sample_report());
        assert!(output.contains("Found: 2  Skipped: 1  Attempted: 1  Succeeded: 0  Failed: 1"));
        assert!(output.contains("Duration this run: 0.30 s"));
        assert!(output.contains("Cumulative recorded duration: 4.50 s"));
    }

    #[test]
    fn items_show_skip_and_failure_detail() {
        let output = format_human_output(&sample_report());
        assert!(output.contains("⊘ a.sif (skipped, 4.2 s recorded)"));
        assert!(output.contains("✗ b.sif (exit 7, 0.3 s)"));
        assert!(output.contains("artifact: callgrind_output/b.sif.callgrind"));
    }
}
