use crate::error::Error;
use crate::models::{ArchiveFile, ArchiveType};
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Canonicalise a run root. Missing roots are `NotFound`, files are
/// `NotADirectory`.
pub fn resolve_root(root: &Path) -> Result<PathBuf, Error> {
    let canonical = match fs::canonicalize(root) {
        Ok(path) => path,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(root.to_path_buf()));
        }
        Err(err) => return Err(Error::Io(err)),
    };
    if !canonical.is_dir() {
        return Err(Error::NotADirectory(canonical));
    }
    Ok(canonical)
}

pub(crate) fn compile_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Recursive scan for archives of the selected type under `root`, the root
/// itself included. Symlinks are not followed. The result is sorted and free
/// of duplicates.
pub fn locate_archives(
    root: &Path,
    archive_type: ArchiveType,
    ignore_globs: &[String],
) -> Result<Vec<ArchiveFile>, Error> {
    if !root.exists() {
        return Err(Error::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let ignore_patterns = compile_patterns(ignore_globs);
    let mut files: Vec<ArchiveFile> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !ignore_patterns
                    .iter()
                    .any(|pattern| pattern.matches_path(entry.path()))
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(file) = ArchiveFile::from_path(entry.into_path()) {
            if archive_type.matches(file.kind) {
                files.push(file);
            }
        }
    }

    files.sort();
    files.dedup_by(|a, b| a.path == b.path);

    debug!(
        "Located {} {} archive(s) under {}",
        files.len(),
        archive_type,
        root.display()
    );
    Ok(files)
}
