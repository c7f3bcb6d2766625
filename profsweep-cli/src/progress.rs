//! Live progress display
//!
//! Renders the engine's observer callbacks as an `indicatif` progress bar
//! plus one completed line per item, in the harness's
//! `NN [Skip]/[Run]` style.

use indicatif::{ProgressBar, ProgressStyle};
use profsweep_core::{ExecOutcome, ItemStatus, SweepObserver, WorkItem};

/// Observer that drives a terminal progress bar.
#[derive(Default)]
pub struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    fn bar(&mut self, total: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        })
    }

    /// Clear the bar once the sweep is over.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn counter(sequence: u64, total: usize) -> String {
    let width = total.to_string().len();
    format!("{sequence:0width$}")
}

impl SweepObserver for ProgressObserver {
    fn item_skipped(&mut self, sequence: u64, total: usize, item: &WorkItem, prior: f64) {
        let line = format!(
            "  {} [Skip] {} -- {:.1} s",
            counter(sequence, total),
            item.base_name(),
            prior
        );
        let bar = self.bar(total);
        bar.println(line);
        bar.inc(1);
    }

    fn item_started(&mut self, sequence: u64, total: usize, item: &WorkItem) {
        let message = format!("{} {}", counter(sequence, total), item.base_name());
        self.bar(total).set_message(message);
    }

    fn item_finished(&mut self, sequence: u64, total: usize, item: &WorkItem, outcome: &ExecOutcome) {
        let detail = match (outcome.status, outcome.exit_code) {
            (ItemStatus::Failed, Some(code)) => format!("{}: {}", outcome.status, code),
            _ => outcome.status.to_string(),
        };
        let line = format!(
            "  {} [Run] {} ({}) -- {:.1} s",
            counter(sequence, total),
            item.base_name(),
            detail,
            outcome.duration.as_secs_f64()
        );
        let bar = self.bar(total);
        bar.println(line);
        bar.inc(1);
    }
}
