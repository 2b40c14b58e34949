use clap::{Args, Parser, Subcommand, ValueEnum};
use comic_tidy_core::{ArchiveType, PruneMode, Strategy};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "comic-tidy")]
#[command(about = "Flatten, prune and convert comic book archive libraries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert .cbr comic files to .cbz
    Convert(ConvertArgs),
    /// Move all .cbz/.cbr files into DIRECTORY root
    Flatten(FlattenArgs),
    /// Flatten, prune, convert, and replace all .cbr files with .cbz (no prompts)
    Nuke {
        directory: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Remove empty directories after flattening
    #[arg(long)]
    pub prune: bool,
    /// Show which folders would be removed by --prune without deleting them
    #[arg(long)]
    pub prune_dry_run: bool,
}

impl PruneArgs {
    pub fn mode(&self) -> Option<PruneMode> {
        PruneMode::from_flags(self.prune, self.prune_dry_run)
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Run without actual conversion
    #[arg(long)]
    pub dry_run: bool,
    /// Prompt to delete original files after conversion
    #[arg(long)]
    pub delete: bool,
    /// Replace original .cbr files with converted .cbz files
    #[arg(long)]
    pub replace: bool,
    /// Immediately delete .cbr and replace with .cbz in source dir (no prompt)
    #[arg(long)]
    pub force_replace: bool,
    /// Move all .cbz files into a single output folder, resolving name conflicts
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub flatten: Option<StrategyArg>,
    #[command(flatten)]
    pub prune: PruneArgs,
}

#[derive(Debug, Args)]
pub struct FlattenArgs {
    pub directory: PathBuf,
    /// File type to flatten [default: from config, else cbz]
    #[arg(long = "type", value_enum)]
    pub file_type: Option<TypeArg>,
    /// Collision strategy [default: from config, else rename]
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
    #[command(flatten)]
    pub prune: PruneArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Rename,
    Overwrite,
    Skip,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Rename => Strategy::Rename,
            StrategyArg::Overwrite => Strategy::Overwrite,
            StrategyArg::Skip => Strategy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Cbz,
    Cbr,
    All,
}

impl From<TypeArg> for ArchiveType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Cbz => ArchiveType::Cbz,
            TypeArg::Cbr => ArchiveType::Cbr,
            TypeArg::All => ArchiveType::All,
        }
    }
}
