pub mod collision;

pub use collision::{next_free_name, resolve_collision, Resolution, SkipReason};

use crate::config::AppConfig;
use crate::error::Error;
use crate::models::{ArchiveFile, ArchiveType, Strategy};
use crate::progress::ProgressReporter;
use crate::prune::{PruneEngine, PruneMode, PruneReport};
use crate::scanner;
use collision::is_occupied;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Result of placing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(PathBuf),
    Skipped(SkipReason),
    Overwritten(PathBuf),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenTally {
    pub moved: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub failed: usize,
}

impl FlattenTally {
    fn record(&mut self, outcome: &MoveOutcome) {
        match outcome {
            MoveOutcome::Moved(_) => self.moved += 1,
            MoveOutcome::Skipped(_) => self.skipped += 1,
            MoveOutcome::Overwritten(_) => self.overwritten += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlattenReport {
    pub root: PathBuf,
    pub strategy: Strategy,
    pub tally: FlattenTally,
    pub prune: Option<PruneReport>,
}

/// Moves every matching archive under a root directly into that root.
pub struct FlattenEngine {
    root: PathBuf,
    archive_type: ArchiveType,
    strategy: Strategy,
    prune: Option<PruneMode>,
    ignore_patterns: Vec<String>,
}

impl FlattenEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            archive_type: ArchiveType::default(),
            strategy: Strategy::default(),
            prune: None,
            ignore_patterns: Vec::new(),
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self::new(root)
            .with_type(config.default_type)
            .with_strategy(config.default_strategy)
            .with_ignore_patterns(config.ignore_patterns.clone())
    }

    pub fn with_type(mut self, archive_type: ArchiveType) -> Self {
        self.archive_type = archive_type;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_prune(mut self, prune: Option<PruneMode>) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Flatten the tree, then prune it if a prune mode was set.
    ///
    /// A missing root aborts the run. Failures on individual files are
    /// logged, counted in `failed`, and the run carries on.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<FlattenReport, Error> {
        let root = scanner::resolve_root(&self.root)?;
        let files = scanner::locate_archives(&root, self.archive_type, &self.ignore_patterns)?;
        info!(
            "Flattening {} {} file(s) into {} (strategy: {})",
            files.len(),
            self.archive_type,
            root.display(),
            self.strategy
        );

        let mut tally = FlattenTally::default();

        for file in &files {
            let dest = root.join(&file.base_name);
            if file.path == dest {
                continue;
            }

            match self.place(file, &dest) {
                Ok(outcome) => {
                    tally.record(&outcome);
                    reporter.on_file_outcome(file, &outcome);
                }
                Err(err) => {
                    error!("Could not move {}: {}", file.path.display(), err);
                    tally.failed += 1;
                }
            }
        }

        let mut report = FlattenReport {
            root: root.clone(),
            strategy: self.strategy,
            tally,
            prune: None,
        };
        reporter.on_flatten_complete(&report);
        info!("Flattening complete.");

        if let Some(mode) = self.prune {
            report.prune = Some(PruneEngine::new(&root, mode).run(reporter)?);
        }

        Ok(report)
    }

    fn place(&self, file: &ArchiveFile, dest: &Path) -> Result<MoveOutcome, Error> {
        if !is_occupied(dest) {
            fs::rename(&file.path, dest)?;
            info!("Moved: {}", dest.display());
            return Ok(MoveOutcome::Moved(dest.to_path_buf()));
        }

        match resolve_collision(dest, self.strategy) {
            Resolution::Overwrite(target) => {
                fs::rename(&file.path, &target)?;
                warn!("Overwrote: {}", target.display());
                Ok(MoveOutcome::Overwritten(target))
            }
            Resolution::Rename(target) => {
                fs::rename(&file.path, &target)?;
                info!("Renamed and moved: {}", target.display());
                Ok(MoveOutcome::Moved(target))
            }
            Resolution::Skip(reason) => {
                warn!("Skipped ({}): {}", reason, file.path.display());
                Ok(MoveOutcome::Skipped(reason))
            }
        }
    }
}
