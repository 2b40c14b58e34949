use crate::config::AppConfig;
use crate::convert::{ConvertOptions, ConvertReport, Converter};
use crate::error::Error;
use crate::flatten::{FlattenEngine, FlattenReport};
use crate::models::{ArchiveType, Strategy};
use crate::progress::ProgressReporter;
use crate::prune::PruneMode;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Flatten,
    PrepareTemp,
    Convert,
    Cleanup,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Flatten => "Flattening folder structure",
            PipelineStage::PrepareTemp => "Preparing temp folder for conversion",
            PipelineStage::Convert => "Converting and replacing .cbr files",
            PipelineStage::Cleanup => "Cleaning up temp folder",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub flatten: FlattenReport,
    pub convert: ConvertReport,
    pub temp_dir: PathBuf,
}

/// The no-questions-asked cleanup run: flatten everything with pruning,
/// convert every `.cbr` in place through a temp folder, then drop the temp
/// folder.
///
/// Settings are fixed. Flatten and convert failures abort the run and leave
/// the tree as far as it got.
pub struct Pipeline {
    root: PathBuf,
    temp_dir_name: String,
    ignore_patterns: Vec<String>,
}

impl Pipeline {
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            root: root.into(),
            temp_dir_name: config.temp_dir_name.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    pub fn run(
        &self,
        converter: &dyn Converter,
        reporter: &dyn ProgressReporter,
    ) -> Result<PipelineReport, Error> {
        reporter.on_stage(PipelineStage::Flatten);
        info!("{}...", PipelineStage::Flatten);
        let flatten = FlattenEngine::new(&self.root)
            .with_type(ArchiveType::All)
            .with_strategy(Strategy::Rename)
            .with_prune(Some(PruneMode::Execute))
            .with_ignore_patterns(self.ignore_patterns.clone())
            .run(reporter)?;

        let temp_dir = flatten.root.join(&self.temp_dir_name);
        reporter.on_stage(PipelineStage::PrepareTemp);
        fs::create_dir_all(&temp_dir)?;
        info!("Using temp folder for conversion: {}", temp_dir.display());

        reporter.on_stage(PipelineStage::Convert);
        info!("{}...", PipelineStage::Convert);
        let options = ConvertOptions {
            flatten: Some(Strategy::Rename),
            force_replace: true,
            ..ConvertOptions::default()
        };
        let convert = converter.run(&flatten.root, &temp_dir, &options, reporter)?;

        if temp_dir.exists() {
            reporter.on_stage(PipelineStage::Cleanup);
            info!("Cleaning up temp folder: {}", temp_dir.display());
            if let Err(err) = fs::remove_dir_all(&temp_dir) {
                warn!("Could not remove temp folder {}: {}", temp_dir.display(), err);
            }
        }

        info!("Cleanup pipeline complete for {}", flatten.root.display());
        Ok(PipelineReport {
            flatten,
            convert,
            temp_dir,
        })
    }
}
