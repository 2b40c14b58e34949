use crate::convert::ConvertReport;
use crate::flatten::{FlattenReport, MoveOutcome};
use crate::models::ArchiveFile;
use crate::pipeline::PipelineStage;
use crate::prune::PruneReport;
use std::path::Path;

/// Trait for reporting run progress and stage summaries.
///
/// CLI implements with indicatif/colored output. All methods have default
/// no-op implementations; `confirm` declines by default.
pub trait ProgressReporter {
    fn on_file_outcome(&self, _file: &ArchiveFile, _outcome: &MoveOutcome) {}
    fn on_flatten_complete(&self, _report: &FlattenReport) {}
    /// An empty directory was found, just before it is recorded or removed.
    fn on_empty_dir(&self, _dir: &Path) {}
    fn on_prune_complete(&self, _report: &PruneReport) {}
    fn on_convert_start(&self, _total: usize) {}
    fn on_convert_progress(&self, _done: usize, _total: usize) {}
    fn on_convert_complete(&self, _report: &ConvertReport) {}
    fn on_stage(&self, _stage: PipelineStage) {}

    /// Ask before an irreversible step on an original file.
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
