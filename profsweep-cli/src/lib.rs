#![warn(missing_docs)]
//! Profsweep CLI Library
//!
//! This crate provides the command-line surface for the sweep engine:
//! argument parsing, `profsweep.toml` layering, progress display, and
//! report output. The binary's main function is just
//! `profsweep_cli::run()`.

mod config;
mod progress;

pub use config::*;
pub use progress::ProgressObserver;

use clap::{Parser, Subcommand};
use profsweep_core::{
    discover, ItemDisposition, ItemStatus, Orchestrator, ProfilerConfig, RunOutcome, SweepConfig,
};
use profsweep_report::{
    format_human_output, generate_json_report, ItemReport, ItemReportStatus, OutputFormat,
    ProfilerMeta, Report, ReportMeta, SummaryReport, SCHEMA_VERSION,
};
use std::io::Write;
use std::path::PathBuf;

/// Profsweep CLI arguments
#[derive(Parser, Debug)]
#[command(name = "profsweep")]
#[command(
    author,
    version,
    about = "Profsweep - resumable profiling sweeps over a file corpus"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sweep, resuming from the ledger
    Run {
        /// Path to the program to run on each work item
        program: PathBuf,

        /// Directory to search recursively for work items
        search_dir: PathBuf,

        /// Ledger file for reading/writing results
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Work-item file-name suffix
        #[arg(long)]
        suffix: Option<String>,

        /// Run the program under the profiling wrapper
        #[arg(long)]
        use_profiler: bool,

        /// Directory for profiler artifacts
        #[arg(long)]
        profiler_output_dir: Option<PathBuf>,

        /// Output format: human, json
        #[arg(long, default_value = "human")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the discovered corpus without executing anything
    List {
        /// Directory to search recursively for work items
        search_dir: PathBuf,

        /// Work-item file-name suffix
        #[arg(long)]
        suffix: Option<String>,
    },
}

/// Run the Profsweep CLI with the given arguments.
/// This is the main entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Profsweep CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("profsweep_core=debug,profsweep_cli=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("profsweep_core=info,profsweep_cli=info")
            .init();
    }

    // Discover profsweep.toml configuration (CLI flags override)
    let file_config = FileConfig::discover().unwrap_or_default();

    match cli.command {
        Commands::Run {
            program,
            search_dir,
            ledger,
            suffix,
            use_profiler,
            profiler_output_dir,
            format,
            output,
        } => {
            let format: OutputFormat = format.parse().unwrap_or(OutputFormat::Human);
            let sweep = build_sweep_config(
                program,
                search_dir,
                ledger,
                suffix,
                use_profiler,
                profiler_output_dir,
                &file_config,
            );
            run_sweep(sweep, format, output)
        }
        Commands::List { search_dir, suffix } => {
            let suffix = suffix.unwrap_or_else(|| file_config.sweep.suffix.clone());
            list_corpus(&search_dir, &suffix)
        }
    }
}

/// Layer CLI flags over profsweep.toml values into an engine config.
fn build_sweep_config(
    program: PathBuf,
    search_dir: PathBuf,
    ledger: Option<PathBuf>,
    suffix: Option<String>,
    use_profiler: bool,
    profiler_output_dir: Option<PathBuf>,
    file_config: &FileConfig,
) -> SweepConfig {
    let profiler = (use_profiler || file_config.profiler.enabled).then(|| ProfilerConfig {
        command: file_config.profiler.command.clone(),
        tool: file_config.profiler.tool.clone(),
        output_dir: profiler_output_dir
            .unwrap_or_else(|| PathBuf::from(&file_config.profiler.output_dir)),
        artifact_extension: file_config.profiler.artifact_extension.clone(),
    });

    SweepConfig {
        program,
        root: search_dir,
        ledger_path: ledger.unwrap_or_else(|| PathBuf::from(&file_config.sweep.ledger)),
        suffix: suffix.unwrap_or_else(|| file_config.sweep.suffix.clone()),
        profiler,
    }
}

fn run_sweep(
    config: SweepConfig,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mode = if config.profiler.is_some() {
        "profiled"
    } else {
        "direct"
    };
    println!(
        "Sweeping {} for *{} files ({} execution of {})...",
        config.root.display(),
        config.suffix,
        mode,
        config.program.display()
    );
    println!("Results are appended to: {}", config.ledger_path.display());

    let orchestrator = Orchestrator::new(config.clone());
    let mut observer = ProgressObserver::default();
    let outcome = orchestrator.run(&mut observer)?;
    observer.finish();

    if outcome.summary.found == 0 {
        println!(
            "No *{} files found under {}.",
            config.suffix,
            config.root.display()
        );
    }

    let report = build_report(&config, &outcome);
    let rendered = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    if let Some(ref path) = output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(rendered.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", rendered);
    }

    // Individual item failures do not fail the harness; the sweep
    // completed and its outcomes are in the ledger.
    Ok(())
}

fn list_corpus(search_dir: &std::path::Path, suffix: &str) -> anyhow::Result<()> {
    let corpus = discover(search_dir, suffix)?;
    for item in corpus.items() {
        println!("{}", item.id());
    }
    println!("{} work items found.", corpus.len());
    Ok(())
}

/// Convert the engine's run outcome into the report model.
pub fn build_report(config: &SweepConfig, outcome: &RunOutcome) -> Report {
    let items = outcome
        .items
        .iter()
        .map(|item| match &item.disposition {
            ItemDisposition::Skipped {
                prior_duration_seconds,
            } => ItemReport {
                sequence: item.sequence,
                item_id: item.item_id.clone(),
                status: ItemReportStatus::Skipped,
                exit_code: None,
                duration_seconds: *prior_duration_seconds,
                artifact_path: None,
            },
            ItemDisposition::Executed {
                status,
                exit_code,
                duration_seconds,
                artifact_path,
            } => ItemReport {
                sequence: item.sequence,
                item_id: item.item_id.clone(),
                status: convert_status(*status),
                exit_code: *exit_code,
                duration_seconds: *duration_seconds,
                artifact_path: artifact_path.clone(),
            },
        })
        .collect();

    Report {
        meta: ReportMeta {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            program: config.program.display().to_string(),
            root: config.root.display().to_string(),
            ledger: config.ledger_path.display().to_string(),
            profiler: config.profiler.as_ref().map(|p| ProfilerMeta {
                command: p.command.clone(),
                tool: p.tool.clone(),
                output_dir: p.output_dir.display().to_string(),
            }),
        },
        items,
        summary: SummaryReport {
            found: outcome.summary.found,
            skipped: outcome.summary.skipped,
            attempted: outcome.summary.attempted,
            succeeded: outcome.summary.succeeded,
            failed: outcome.summary.failed,
            run_duration_seconds: outcome.summary.run_duration_seconds,
            prior_duration_seconds: outcome.summary.prior_duration_seconds,
            cumulative_duration_seconds: outcome.summary.cumulative_duration_seconds(),
        },
    }
}

fn convert_status(status: ItemStatus) -> ItemReportStatus {
    match status {
        ItemStatus::Success => ItemReportStatus::Success,
        ItemStatus::Failed => ItemReportStatus::Failed,
        ItemStatus::LaunchError => ItemReportStatus::LaunchError,
        ItemStatus::InternalError => ItemReportStatus::InternalError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> Vec<String> {
        let mut args = vec!["profsweep", "run", "/usr/bin/render", "corpus"];
        args.extend_from_slice(extra);
        args.into_iter().map(str::to_string).collect()
    }

    #[test]
    fn cli_flags_override_file_config() {
        let cli = Cli::parse_from(run_args(&[
            "--ledger",
            "other.csv",
            "--suffix",
            ".svg",
            "--use-profiler",
            "--profiler-output-dir",
            "artifacts",
        ]));
        let Commands::Run {
            program,
            search_dir,
            ledger,
            suffix,
            use_profiler,
            profiler_output_dir,
            ..
        } = cli.command
        else {
            panic!("expected run subcommand");
        };

        let file_config = FileConfig::default();
        let sweep = build_sweep_config(
            program,
            search_dir,
            ledger,
            suffix,
            use_profiler,
            profiler_output_dir,
            &file_config,
        );

        assert_eq!(sweep.ledger_path, PathBuf::from("other.csv"));
        assert_eq!(sweep.suffix, ".svg");
        let profiler = sweep.profiler.expect("profiler enabled via flag");
        assert_eq!(profiler.output_dir, PathBuf::from("artifacts"));
        assert_eq!(profiler.command, "valgrind");
    }

    #[test]
    fn file_config_supplies_defaults() {
        let cli = Cli::parse_from(run_args(&[]));
        let Commands::Run {
            program,
            search_dir,
            ledger,
            suffix,
            use_profiler,
            profiler_output_dir,
            ..
        } = cli.command
        else {
            panic!("expected run subcommand");
        };

        let file_config: FileConfig = toml::from_str(
            r#"
            [sweep]
            ledger = "sweep.csv"
            suffix = ".svg"

            [profiler]
            enabled = true
            output_dir = "artifacts"
            "#,
        )
        .unwrap();

        let sweep = build_sweep_config(
            program,
            search_dir,
            ledger,
            suffix,
            use_profiler,
            profiler_output_dir,
            &file_config,
        );

        assert_eq!(sweep.ledger_path, PathBuf::from("sweep.csv"));
        assert_eq!(sweep.suffix, ".svg");
        let profiler = sweep.profiler.expect("profiler enabled via file config");
        assert_eq!(profiler.output_dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn skipped_and_executed_items_map_into_the_report() {
        use profsweep_core::{ItemResult, RunSummary};

        let config = SweepConfig {
            program: PathBuf::from("/usr/bin/render"),
            root: PathBuf::from("/corpus"),
            ledger_path: PathBuf::from("results.csv"),
            suffix: ".sif".to_string(),
            profiler: None,
        };
        let outcome = RunOutcome {
            summary: RunSummary {
                found: 2,
                skipped: 1,
                attempted: 1,
                succeeded: 0,
                failed: 1,
                run_duration_seconds: 0.5,
                prior_duration_seconds: 2.0,
            },
            items: vec![
                ItemResult {
                    sequence: 1,
                    item_id: "a.sif".to_string(),
                    disposition: ItemDisposition::Skipped {
                        prior_duration_seconds: 2.0,
                    },
                },
                ItemResult {
                    sequence: 2,
                    item_id: "b.sif".to_string(),
                    disposition: ItemDisposition::Executed {
                        status: ItemStatus::Failed,
                        exit_code: Some(7),
                        duration_seconds: 0.5,
                        artifact_path: None,
                    },
                },
            ],
        };

        let report = build_report(&config, &outcome);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].status, ItemReportStatus::Skipped);
        assert_eq!(report.items[1].status, ItemReportStatus::Failed);
        assert_eq!(report.items[1].exit_code, Some(7));
        assert!((report.summary.cumulative_duration_seconds - 2.5).abs() < 1e-9);
    }
}
