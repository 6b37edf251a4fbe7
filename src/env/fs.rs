//! Filesystem-backed env.

use std::fs;
use std::io;
use std::path::Path;

use crate::env::Env;

/// Reads through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnv;

impl Env for DefaultEnv {
    fn name(&self) -> &str {
        "default"
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}
