use crate::models::Strategy;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NameConflict,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NameConflict => f.write_str("name conflict"),
        }
    }
}

/// Filesystem action chosen for an occupied destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Overwrite(PathBuf),
    Rename(PathBuf),
    Skip(SkipReason),
}

/// A path counts as occupied if anything sits there, dangling symlinks included.
pub fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Decide what happens to a file whose destination is taken. Only existence
/// checks touch the filesystem.
pub fn resolve_collision(dest: &Path, strategy: Strategy) -> Resolution {
    match strategy {
        Strategy::Overwrite => Resolution::Overwrite(dest.to_path_buf()),
        Strategy::Rename => Resolution::Rename(next_free_name(dest)),
        Strategy::Skip => Resolution::Skip(SkipReason::NameConflict),
    }
}

/// First unoccupied `name (n).ext` next to `dest`, probing from 1 upward.
///
/// The counter lives only for this call, so every collision probes against
/// whatever is on disk right now.
pub fn next_free_name(dest: &Path) -> PathBuf {
    let dir = dest.parent().unwrap_or_else(|| Path::new(""));
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dest
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut count: u64 = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, count, ext));
        if !is_occupied(&candidate) {
            return candidate;
        }
        count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_probes_from_one() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("Saga 01.cbz");
        fs::write(&dest, b"a").unwrap();

        assert_eq!(
            resolve_collision(&dest, Strategy::Rename),
            Resolution::Rename(tmp.path().join("Saga 01 (1).cbz"))
        );
    }

    #[test]
    fn test_rename_skips_taken_counters() {
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("foo.cbr");
        fs::write(&dest, b"a").unwrap();
        fs::write(tmp.path().join("foo (1).cbr"), b"b").unwrap();
        fs::write(tmp.path().join("foo (2).cbr"), b"c").unwrap();

        assert_eq!(next_free_name(&dest), tmp.path().join("foo (3).cbr"));
    }

    #[test]
    fn test_overwrite_and_skip_keep_destination() {
        let dest = Path::new("/comics/foo.cbz");
        assert_eq!(
            resolve_collision(dest, Strategy::Overwrite),
            Resolution::Overwrite(dest.to_path_buf())
        );
        assert_eq!(
            resolve_collision(dest, Strategy::Skip),
            Resolution::Skip(SkipReason::NameConflict)
        );
        assert_eq!(SkipReason::NameConflict.to_string(), "name conflict");
    }
}
