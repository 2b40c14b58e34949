pub mod config;
pub mod convert;
pub mod error;
pub mod flatten;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod prune;
pub mod scanner;

pub use config::AppConfig;
pub use convert::{ArchiveConverter, ConvertOptions, ConvertReport, ConvertTally, Converter};
pub use error::Error;
pub use flatten::{FlattenEngine, FlattenReport, FlattenTally, MoveOutcome, SkipReason};
pub use models::{ArchiveFile, ArchiveKind, ArchiveType, Strategy};
pub use pipeline::{Pipeline, PipelineReport, PipelineStage};
pub use progress::{ProgressReporter, SilentReporter};
pub use prune::{PruneEngine, PruneMode, PruneReport, PruneTally};
