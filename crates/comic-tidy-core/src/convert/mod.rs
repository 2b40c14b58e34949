pub mod archive;

pub use archive::ArchiveConverter;

use crate::error::Error;
use crate::flatten::FlattenReport;
use crate::models::Strategy;
use crate::progress::ProgressReporter;
use crate::prune::{PruneMode, PruneReport};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Report what would be converted without writing anything.
    pub dry_run: bool,
    /// Offer to delete each original after it converts.
    pub delete: bool,
    /// Offer to swap each original for its `.cbz` in the source tree.
    pub replace: bool,
    /// Swap originals for their `.cbz` without asking.
    pub force_replace: bool,
    /// Flatten the destination afterwards with this strategy.
    pub flatten: Option<Strategy>,
    pub prune: Option<PruneMode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertTally {
    pub converted: usize,
    pub would_convert: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Converted fine, but replacing or deleting the original failed.
    pub replace_failed: usize,
}

#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub tally: ConvertTally,
    pub flatten: Option<FlattenReport>,
    pub prune: Option<PruneReport>,
}

/// Turns `.cbr` archives under `source` into `.cbz` archives under `dest`.
///
/// An `Err` means the stage as a whole failed; callers do not retry or roll
/// back.
pub trait Converter {
    fn run(
        &self,
        source: &Path,
        dest: &Path,
        options: &ConvertOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<ConvertReport, Error>;
}
