//! Filesystem seam between the counter reader and the kernel's pseudo-files.
//!
//! Every accessor in [`crate::system::reader`] goes through [`FileSystem`], so
//! the same parsing and defaulting logic runs against the real `/proc` or an
//! in-memory [`MockFs`](crate::system::mock::MockFs) in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of the files a monitor samples.
///
/// Implementations must not keep handles open between calls: each method
/// opens, reads and releases its source before returning.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Raw bytes, for sources that are not valid UTF-8 line text (`cmdline`).
    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Direct children of `path` as full paths, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn is_dir(&self, path: &Path) -> bool;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        RealFs
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(path)?.flatten() {
            out.push(entry.path());
        }
        Ok(out)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
