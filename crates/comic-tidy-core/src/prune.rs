use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneMode {
    DryRun,
    Execute,
    Both,
}

impl PruneMode {
    /// Map the `--prune` / `--prune-dry-run` flag pair to a mode.
    pub fn from_flags(prune: bool, dry_run: bool) -> Option<Self> {
        match (prune, dry_run) {
            (true, true) => Some(PruneMode::Both),
            (true, false) => Some(PruneMode::Execute),
            (false, true) => Some(PruneMode::DryRun),
            (false, false) => None,
        }
    }

    pub fn simulates(self) -> bool {
        matches!(self, PruneMode::DryRun | PruneMode::Both)
    }

    pub fn executes(self) -> bool {
        matches!(self, PruneMode::Execute | PruneMode::Both)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneTally {
    pub removed: usize,
    pub would_remove: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct PruneReport {
    pub root: PathBuf,
    pub mode: PruneMode,
    pub tally: PruneTally,
}

/// Removes (or reports) directories under a root that hold nothing. The root
/// itself is never touched.
pub struct PruneEngine {
    root: PathBuf,
    mode: PruneMode,
}

impl PruneEngine {
    pub fn new(root: impl Into<PathBuf>, mode: PruneMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<PruneReport, Error> {
        let root = scanner::resolve_root(&self.root)?;
        info!("Checking for empty directories under {}...", root.display());

        let mut tally = PruneTally::default();
        // Directories gone from the tree, really or (in dry-run) virtually.
        let mut cleared: HashSet<PathBuf> = HashSet::new();

        for dir in order_deepest_first(collect_directories(&root)) {
            match is_effectively_empty(&dir, &cleared) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!("Could not inspect folder {}: {}", dir.display(), err);
                    tally.failed += 1;
                    continue;
                }
            }

            reporter.on_empty_dir(&dir);

            if self.mode.simulates() {
                info!("[dry-run] Would remove: {}", dir.display());
                tally.would_remove += 1;
            }

            if self.mode.executes() {
                match fs::remove_dir(&dir) {
                    Ok(()) => {
                        info!("Removed empty folder: {}", dir.display());
                        tally.removed += 1;
                    }
                    Err(err) => {
                        warn!("Could not remove folder {}: {}", dir.display(), err);
                        tally.failed += 1;
                        continue;
                    }
                }
            }

            cleared.insert(dir);
        }

        let report = PruneReport {
            root,
            mode: self.mode,
            tally,
        };
        reporter.on_prune_complete(&report);
        Ok(report)
    }
}

fn collect_directories(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

/// Deepest paths first, so children are settled before their parent is
/// checked. Ties fall back to reverse lexical order.
pub fn order_deepest_first(mut dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    dirs.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| b.cmp(a))
    });
    dirs
}

/// Empty at the moment of the visit, ignoring entries already cleared in
/// this pass.
fn is_effectively_empty(dir: &Path, cleared: &HashSet<PathBuf>) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !cleared.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}
