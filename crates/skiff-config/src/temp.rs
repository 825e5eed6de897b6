//! Storage directory allocation.

use std::io;
use std::path::PathBuf;

/// Default prefix for allocated log directories.
pub const DEFAULT_LOG_DIR_PREFIX: &str = "skiff-log-";

/// Hands out fresh, uniquely named directories.
pub trait TempDirAllocator: Send + Sync {
    /// Create a new empty directory and return its path.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be created.
    fn allocate(&self) -> io::Result<PathBuf>;
}

/// Allocates directories under the system temp dir.
///
/// Directories are left on disk; whoever runs the broker removes them.
#[derive(Debug, Clone)]
pub struct SystemTempDirs {
    prefix: String,
}

impl Default for SystemTempDirs {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_DIR_PREFIX)
    }
}

impl SystemTempDirs {
    /// Allocator whose directory names start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TempDirAllocator for SystemTempDirs {
    fn allocate(&self) -> io::Result<PathBuf> {
        let dir = tempfile::Builder::new().prefix(&self.prefix).tempdir()?;
        #[allow(deprecated)]
        let path = dir.into_path();
        Ok(path)
    }
}
