use super::{ConvertOptions, ConvertReport, ConvertTally, Converter};
use crate::config::AppConfig;
use crate::error::Error;
use crate::flatten::collision::is_occupied;
use crate::flatten::{resolve_collision, FlattenEngine, Resolution};
use crate::models::{ArchiveFile, ArchiveType, Strategy};
use crate::progress::ProgressReporter;
use crate::prune::PruneEngine;
use crate::scanner;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Repackages RAR comics as deflate ZIPs. CBRs that are really ZIPs are
/// copied byte for byte.
#[derive(Debug, Clone, Default)]
pub struct ArchiveConverter {
    ignore_patterns: Vec<String>,
}

impl ArchiveConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    fn finish_original(
        &self,
        file: &ArchiveFile,
        converted: &Path,
        options: &ConvertOptions,
        reporter: &dyn ProgressReporter,
        tally: &mut ConvertTally,
    ) -> Result<(), Error> {
        let swap = options.force_replace
            || (options.replace
                && reporter.confirm(&format!(
                    "Replace {} with its converted .cbz?",
                    file.path.display()
                )));

        if swap {
            let mut target = file.path.with_extension("cbz");
            if is_occupied(&target) {
                match resolve_collision(&target, options.flatten.unwrap_or(Strategy::Rename)) {
                    Resolution::Overwrite(path) => {
                        warn!("Overwriting existing {}", path.display());
                        target = path;
                    }
                    Resolution::Rename(path) => target = path,
                    Resolution::Skip(reason) => {
                        warn!(
                            "Kept original ({}): {} already exists",
                            reason,
                            target.display()
                        );
                        return Ok(());
                    }
                }
            }
            move_file(converted, &target)?;
            fs::remove_file(&file.path)?;
            info!("Replaced: {} -> {}", file.path.display(), target.display());
            tally.replaced += 1;
        } else if options.delete
            && reporter.confirm(&format!("Delete original {}?", file.path.display()))
        {
            fs::remove_file(&file.path)?;
            info!("Deleted original: {}", file.path.display());
            tally.deleted += 1;
        }
        Ok(())
    }
}

impl Converter for ArchiveConverter {
    fn run(
        &self,
        source: &Path,
        dest: &Path,
        options: &ConvertOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<ConvertReport, Error> {
        let source_root = scanner::resolve_root(source)?;
        let dest_root = if options.dry_run {
            dest.to_path_buf()
        } else {
            fs::create_dir_all(dest)?;
            scanner::resolve_root(dest)?
        };

        let files = scanner::locate_archives(&source_root, ArchiveType::Cbr, &self.ignore_patterns)?;
        let total = files.len();
        info!(
            "Converting {} .cbr file(s) from {} into {}",
            total,
            source_root.display(),
            dest_root.display()
        );
        reporter.on_convert_start(total);

        let mut tally = ConvertTally::default();

        for (index, file) in files.iter().enumerate() {
            let out = output_path(&source_root, &dest_root, file);

            if options.dry_run {
                info!(
                    "[dry-run] Would convert: {} -> {}",
                    file.path.display(),
                    out.display()
                );
                tally.would_convert += 1;
            } else {
                match convert_archive(&file.path, &out) {
                    Ok(()) => {
                        info!("Converted: {}", out.display());
                        tally.converted += 1;
                        if let Err(err) =
                            self.finish_original(file, &out, options, reporter, &mut tally)
                        {
                            warn!("Could not finish with original {}: {}", file.path.display(), err);
                            tally.replace_failed += 1;
                        }
                    }
                    Err(err) => {
                        error!("Failed to convert {}: {}", file.path.display(), err);
                        tally.failed += 1;
                    }
                }
            }

            reporter.on_convert_progress(index + 1, total);
        }

        let mut report = ConvertReport {
            source: source_root,
            dest: dest_root.clone(),
            tally,
            flatten: None,
            prune: None,
        };
        reporter.on_convert_complete(&report);

        if options.dry_run {
            return Ok(report);
        }

        if let Some(strategy) = options.flatten {
            report.flatten = Some(
                FlattenEngine::new(&dest_root)
                    .with_type(ArchiveType::Cbz)
                    .with_strategy(strategy)
                    .with_prune(options.prune)
                    .run(reporter)?,
            );
        } else if let Some(mode) = options.prune {
            report.prune = Some(PruneEngine::new(&dest_root, mode).run(reporter)?);
        }

        Ok(report)
    }
}

/// `dest/<dir relative to source>/<stem>.cbz`
fn output_path(source_root: &Path, dest_root: &Path, file: &ArchiveFile) -> PathBuf {
    let relative_dir = file
        .path
        .parent()
        .and_then(|parent| parent.strip_prefix(source_root).ok())
        .unwrap_or_else(|| Path::new(""));
    dest_root
        .join(relative_dir)
        .join(format!("{}.cbz", file.stem()))
}

fn convert_archive(src: &Path, out: &Path) -> Result<(), Error> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }

    if is_zip(src)? {
        debug!("{} is already a ZIP, copying", src.display());
        fs::copy(src, out)?;
        return Ok(());
    }

    let staging = tempfile::tempdir()?;
    extract_rar(src, staging.path())?;
    pack_directory(staging.path(), out)
}

fn is_zip(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == ZIP_MAGIC),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

fn extract_rar(archive_path: &Path, dest_dir: &Path) -> Result<(), Error> {
    let path_str = archive_path
        .to_str()
        .ok_or_else(|| Error::Archive("RAR path contains invalid UTF-8".to_string()))?;
    let dest_str = dest_dir
        .to_str()
        .ok_or_else(|| Error::Archive("Dest path contains invalid UTF-8".to_string()))?;

    rar::Archive::extract_all(path_str, dest_str, "")
        .map_err(|e| Error::Archive(format!("Failed to extract RAR: {e:?}")))?;
    Ok(())
}

/// Zip every entry under `source_dir` into `archive_path`, in path order so
/// readers see pages in sequence.
pub(crate) fn pack_directory(source_dir: &Path, archive_path: &Path) -> Result<(), Error> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let name = path
            .strip_prefix(source_dir)
            .map_err(|e| Error::Other(format!("Path prefix error: {}", e)))?
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(name.as_str(), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name.as_str(), options)?;
            let mut f = File::open(path)?;
            io::copy(&mut f, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

#[cfg(unix)]
const CROSS_DEVICE_OS_ERROR: i32 = 18; // EXDEV
#[cfg(windows)]
const CROSS_DEVICE_OS_ERROR: i32 = 17; // ERROR_NOT_SAME_DEVICE

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(any(unix, windows))]
    {
        err.raw_os_error() == Some(CROSS_DEVICE_OS_ERROR)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = err;
        false
    }
}

/// Rename, falling back to copy + remove only across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            debug!("{} crosses filesystems, copying", from.display());
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}
