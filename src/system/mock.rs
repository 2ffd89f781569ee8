//! In-memory [`FileSystem`] for exercising the reader and collector without a
//! live `/proc`. Used by unit tests, integration tests and benches.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::fs::FileSystem;

#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating its parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path, content.as_ref().to_vec());
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let mut current = Some(path.as_ref());
        while let Some(p) = current {
            if p.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(p.to_path_buf());
            current = p.parent();
        }
    }

    /// Adds `/proc/<pid>/{stat,status,cmdline}` under `proc_root`.
    pub fn add_process(
        &mut self,
        proc_root: impl AsRef<Path>,
        pid: u32,
        stat: &str,
        status: &str,
        cmdline: &[u8],
    ) {
        let base = proc_root.as_ref().join(pid.to_string());
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("status"), status);
        self.add_file(base.join("cmdline"), cmdline);
    }

    /// Removes a path and everything below it; simulates a process exiting.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such mock path: {}", path.display()),
    )
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.files.get(path).ok_or_else(|| not_found(path))?;
        String::from_utf8(bytes.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(not_found(path));
        }
        let mut entries: BTreeSet<PathBuf> = BTreeSet::new();
        let children = self
            .files
            .keys()
            .chain(self.directories.iter())
            .filter(|p| p.parent() == Some(path));
        for child in children {
            entries.insert(child.clone());
        }
        Ok(entries.into_iter().collect())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parents() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");
        assert!(fs.is_dir(Path::new("/proc")));
        assert_eq!(
            fs.read_to_string(Path::new("/proc/meminfo")).unwrap(),
            "MemTotal: 16384 kB\n"
        );
    }

    #[test]
    fn read_dir_lists_direct_children_only() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1/stat", "");
        fs.add_file("/proc/1/status", "");
        fs.add_file("/proc/2/stat", "");
        fs.add_file("/proc/uptime", "1.0 1.0");

        let mut names: Vec<String> = fs
            .read_dir(Path::new("/proc"))
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["1", "2", "uptime"]);
    }

    #[test]
    fn remove_drops_subtree() {
        let mut fs = MockFs::new();
        fs.add_process("/proc", 7, "7 (x) S", "Uid:\t0", b"x\0");
        fs.remove("/proc/7");
        assert!(!fs.is_dir(Path::new("/proc/7")));
        let err = fs.read_to_string(Path::new("/proc/7/stat")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
