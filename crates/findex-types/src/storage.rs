//! Index storage locations.

use std::path::PathBuf;

/// Where an engine index lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// An in-memory index. Starts empty; opening one is always a fresh
    /// start, so open-or-create construction falls back to creation.
    Memory,
    /// A durable index rooted at the given directory. When the index is
    /// named, engines may nest it under a per-name subdirectory.
    Directory(PathBuf),
}

impl StorageTarget {
    /// The directory for durable targets, `None` for in-memory ones.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            StorageTarget::Memory => None,
            StorageTarget::Directory(path) => Some(path),
        }
    }
}

impl From<PathBuf> for StorageTarget {
    fn from(path: PathBuf) -> Self {
        StorageTarget::Directory(path)
    }
}

impl From<&std::path::Path> for StorageTarget {
    fn from(path: &std::path::Path) -> Self {
        StorageTarget::Directory(path.to_path_buf())
    }
}
