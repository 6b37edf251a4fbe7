//! I/O environment handles.
//!
//! # Responsibilities
//! - Define the `Env` capability the loader reads options files through
//! - Provide a shareable, reference-counted handle (`SharedEnv`)
//! - Ship a filesystem-backed env and an in-memory env
//!
//! # Design Decisions
//! - The loader never owns an env: it clones the caller's `Arc` and stores it
//!   in `GlobalOptions::env` so the engine starts with the same backend
//! - `Env` is `Send + Sync` so concurrent loads may share one handle
//! - Equality of handles is by env name, not identity

pub mod fs;
pub mod mem;

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

pub use fs::DefaultEnv;
pub use mem::MemEnv;

/// I/O backend used to read options files and handed to the engine.
pub trait Env: Send + Sync + fmt::Debug {
    /// Short identifier of the backend (e.g. `"default"`, `"mem"`).
    fn name(&self) -> &str;

    /// Read the whole file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reference-counted handle to a caller-owned [`Env`].
#[derive(Clone)]
pub struct SharedEnv(Arc<dyn Env>);

impl SharedEnv {
    pub fn new(env: impl Env + 'static) -> Self {
        Self(Arc::new(env))
    }

    pub fn from_arc(env: Arc<dyn Env>) -> Self {
        Self(env)
    }

    /// Handle to the process filesystem.
    pub fn default_env() -> Self {
        Self::new(DefaultEnv)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// True when both handles point at the same env instance.
    pub fn same_instance(&self, other: &SharedEnv) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.0.read_to_string(path)
    }
}

impl Default for SharedEnv {
    fn default() -> Self {
        Self::default_env()
    }
}

impl PartialEq for SharedEnv {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other) || self.name() == other.name()
    }
}

impl fmt::Debug for SharedEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedEnv").field(&self.name()).finish()
    }
}

impl serde::Serialize for SharedEnv {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
