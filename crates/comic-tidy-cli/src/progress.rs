use colored::*;
use comic_tidy_core::{
    ConvertReport, FlattenReport, PipelineStage, ProgressReporter, PruneReport, Strategy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use crate::prompt::prompt_confirm;

/// CLI progress reporter.
///
/// - Summaries: printed as soon as each stage finishes
/// - Conversion: progress bar (total known from the scan)
/// - Confirmations: interactive y/N prompt, bar suspended while asking
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl ProgressReporter for CliReporter {
    fn on_flatten_complete(&self, report: &FlattenReport) {
        let tally = &report.tally;
        println!("\n{}", "Flatten Summary:".bold());
        println!("  Moved:       {}", tally.moved.to_string().green());
        println!("  Skipped:     {}", tally.skipped.to_string().yellow());
        if report.strategy == Strategy::Overwrite {
            println!("  Overwritten: {}", tally.overwritten.to_string().red());
        }
        if tally.failed > 0 {
            println!("  Failed:      {}", tally.failed.to_string().red());
        }
        println!();
    }

    fn on_prune_complete(&self, report: &PruneReport) {
        let tally = &report.tally;
        println!("\n{}", "Prune Summary:".bold());
        if report.mode.simulates() {
            println!(
                "  Would remove: {} folder{}",
                tally.would_remove.to_string().cyan(),
                plural(tally.would_remove)
            );
        }
        if report.mode.executes() {
            println!(
                "  Actually removed: {} folder{}",
                tally.removed.to_string().green(),
                plural(tally.removed)
            );
        }
        if tally.failed > 0 {
            println!("  Failed: {}", tally.failed.to_string().red());
        }
        println!();
    }

    fn on_convert_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Converting [{bar:30.cyan/dim}] {pos}/{len} archives ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn on_convert_progress(&self, done: usize, _total: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(done as u64);
        }
    }

    fn on_convert_complete(&self, report: &ConvertReport) {
        self.finish_bar();
        let tally = &report.tally;
        println!("\n{}", "Convert Summary:".bold());
        if tally.would_convert > 0 {
            println!("  Would convert: {}", tally.would_convert.to_string().cyan());
        }
        println!("  Converted:     {}", tally.converted.to_string().green());
        if tally.replaced > 0 {
            println!("  Replaced:      {}", tally.replaced.to_string().green());
        }
        if tally.deleted > 0 {
            println!("  Deleted:       {}", tally.deleted.to_string().yellow());
        }
        if tally.failed > 0 {
            println!("  Failed:        {}", tally.failed.to_string().red());
        }
        if tally.replace_failed > 0 {
            println!(
                "  Originals left in place after errors: {}",
                tally.replace_failed.to_string().red()
            );
        }
        println!();
    }

    fn on_stage(&self, stage: PipelineStage) {
        println!("{:>12}  {}", "NUKE".yellow().bold(), stage);
    }

    fn confirm(&self, prompt: &str) -> bool {
        let guard = self.bar.lock().unwrap();
        let ask = || prompt_confirm(prompt, Some(false)).unwrap_or(false);
        match guard.as_ref() {
            Some(pb) => pb.suspend(ask),
            None => ask(),
        }
    }
}
