//! Shared helpers for integration tests.

use std::path::{Path, PathBuf};

use options_loader::cache::{LruCache, SharedCache};
use options_loader::env::{MemEnv, SharedEnv};

/// Path of a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// An in-memory env holding `text` at `/db/OPTIONS`.
#[allow(dead_code)]
pub fn mem_env_with(text: &str) -> (SharedEnv, PathBuf) {
    let mem = MemEnv::new();
    let path = PathBuf::from("/db/OPTIONS");
    mem.write_file(path.clone(), text);
    (SharedEnv::new(mem), path)
}

/// A small LRU cache, as an embedding engine would hand in.
#[allow(dead_code)]
pub fn lru_cache_1000() -> SharedCache {
    SharedCache::new(LruCache::new(1000))
}

/// Write `text` to a fresh temporary directory.
#[allow(dead_code)]
pub fn write_temp(text: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("OPTIONS-000001");
    std::fs::write(&path, text).unwrap();
    (dir, path)
}
