//! Directory listing capability used by the matcher and the library.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub path: PathBuf,
    /// Zero for directories
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

impl ListedEntry {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self::new(path.into(), size, false)
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), 0, true)
    }

    fn new(path: PathBuf, size: u64, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            size,
            modified: None,
            is_dir,
        }
    }
}

/// Lists the immediate children of a directory.
pub trait DirectoryLister: Send + Sync + fmt::Debug {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>>;

    /// Key under which `dir` is recognised when a walk reaches it again
    /// through a link.
    fn canonical(&self, dir: &Path) -> PathBuf {
        dir.to_path_buf()
    }
}

/// Filesystem backed lister.
///
/// Symbolic links are listed as whatever they point at. Dangling links and
/// entries that vanish while the directory is read are skipped. Recursive
/// walkers bound their own depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
        let mut entries = Vec::new();

        for dirent in fs::read_dir(dir)? {
            let dirent = match dirent {
                Ok(dirent) => dirent,
                Err(err) => {
                    warn!(dir = %dir.display(), "skipping unreadable entry: {err}");
                    continue;
                }
            };
            let path = dirent.path();

            // fs::metadata follows links
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    trace!(path = %path.display(), "entry vanished or dangling link");
                    continue;
                }
                Err(err) => {
                    warn!(path = %path.display(), "skipping entry: {err}");
                    continue;
                }
            };

            let is_dir = metadata.is_dir();
            entries.push(ListedEntry {
                name: dirent.file_name().to_string_lossy().into_owned(),
                path,
                size: if is_dir { 0 } else { metadata.len() },
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                is_dir,
            });
        }

        Ok(entries)
    }

    fn canonical(&self, dir: &Path) -> PathBuf {
        fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;

    use super::*;

    /// In-memory tree for exercising recursive logic without touching disk.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryLister {
        dirs: HashMap<PathBuf, Vec<ListedEntry>>,
    }

    impl MemoryLister {
        pub(crate) fn with_dir(
            mut self,
            dir: &str,
            children: Vec<ListedEntry>,
        ) -> Self {
            self.dirs.insert(PathBuf::from(dir), children);
            self
        }
    }

    impl DirectoryLister for MemoryLister {
        fn list(&self, dir: &Path) -> io::Result<Vec<ListedEntry>> {
            self.dirs.get(dir).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, dir.display().to_string())
            })
        }
    }
}
