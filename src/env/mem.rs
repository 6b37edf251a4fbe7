//! In-memory env.
//!
//! Keeps file contents in a concurrent map so tests and embedders can load
//! options without touching disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::env::Env;

/// Env whose files live in memory. Clones share the same file table.
#[derive(Debug, Clone, Default)]
pub struct MemEnv {
    files: Arc<DashMap<PathBuf, String>>,
}

impl MemEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file.
    pub fn write_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove_file(&self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Env for MemEnv {
    fn name(&self) -> &str {
        "mem"
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: no such file in memory env", path.display()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let env = MemEnv::new();
        env.write_file("/opts/OPTIONS-1", "[GlobalOptions]\n");
        assert_eq!(env.file_count(), 1);
        assert_eq!(
            env.read_to_string(Path::new("/opts/OPTIONS-1")).unwrap(),
            "[GlobalOptions]\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let env = MemEnv::new();
        let err = env.read_to_string(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_clones_share_files() {
        let env = MemEnv::new();
        let other = env.clone();
        other.write_file("/a", "x");
        assert!(env.read_to_string(Path::new("/a")).is_ok());
        assert!(env.remove_file(Path::new("/a")));
        assert!(other.read_to_string(Path::new("/a")).is_err());
    }
}
