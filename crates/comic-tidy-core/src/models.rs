use crate::error::Error;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Concrete archive format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArchiveKind {
    Cbz,
    Cbr,
}

impl ArchiveKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Cbz => "cbz",
            ArchiveKind::Cbr => "cbr",
        }
    }

    /// Case-insensitive extension match. Anything else is not an archive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("cbz") {
            Some(ArchiveKind::Cbz)
        } else if ext.eq_ignore_ascii_case("cbr") {
            Some(ArchiveKind::Cbr)
        } else {
            None
        }
    }
}

/// Which archive kinds a locate/flatten run selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    #[default]
    Cbz,
    Cbr,
    All,
}

impl ArchiveType {
    pub fn matches(self, kind: ArchiveKind) -> bool {
        match self {
            ArchiveType::Cbz => kind == ArchiveKind::Cbz,
            ArchiveType::Cbr => kind == ArchiveKind::Cbr,
            ArchiveType::All => true,
        }
    }
}

impl FromStr for ArchiveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbz" => Ok(ArchiveType::Cbz),
            "cbr" => Ok(ArchiveType::Cbr),
            "all" => Ok(ArchiveType::All),
            other => Err(Error::UnknownArchiveType(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchiveType::Cbz => "cbz",
            ArchiveType::Cbr => "cbr",
            ArchiveType::All => "all",
        };
        f.write_str(name)
    }
}

/// What to do when a file's destination name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Overwrite,
    #[default]
    Rename,
    Skip,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Strategy::Overwrite),
            "rename" => Ok(Strategy::Rename),
            "skip" => Ok(Strategy::Skip),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Overwrite => "overwrite",
            Strategy::Rename => "rename",
            Strategy::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// Snapshot of an archive found under a root. Goes stale if the tree changes
/// after the scan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub base_name: String,
    pub kind: ArchiveKind,
}

impl ArchiveFile {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let kind = ArchiveKind::from_path(&path)?;
        let base_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path,
            base_name,
            kind,
        })
    }

    /// File name without its extension, used to build "(n)" alternates.
    pub fn stem(&self) -> String {
        Path::new(&self.base_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
