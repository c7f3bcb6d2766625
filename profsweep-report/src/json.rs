//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Serializes the run report into machine-readable JSON format.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ItemReport, ItemReportStatus, ReportMeta, SummaryReport, SCHEMA_VERSION};

    #[test]
    fn statuses_serialize_as_kebab_case() {
        let report = Report {
            meta: ReportMeta {
                schema_version: SCHEMA_VERSION,
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                program: "/usr/bin/render".to_string(),
                root: "/corpus".to_string(),
                ledger: "results.csv".to_string(),
                profiler: None,
            },
            items: vec![ItemReport {
                sequence: 1,
                item_id: "a.sif".to_string(),
                status: ItemReportStatus::LaunchError,
                exit_code: None,
                duration_seconds: 0.0,
                artifact_path: None,
            }],
            summary: SummaryReport::default(),
        };

        let json = generate_json_report(&report).unwrap();
        assert!(json.contains("\"launch-error\""));
        assert!(json.contains("\"schema_version\": 1"));
    }
}
