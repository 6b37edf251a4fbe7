//! Options file loading.
//!
//! # Data Flow
//! ```text
//! path + env
//!     → source.rs (one read through the caller's env)
//!     → format::tokenize (sections)
//!     → builder.rs (decode, resolve, assign per entry)
//!     → validation.rs (cross-field checks)
//!     → LoadResult (or the first LoadError)
//!
//! On file change:
//!     watcher.rs reruns the load
//!     → new LoadResult sent to the subscriber
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first error aborts the load, nothing partial is returned
//! - Tolerant mode turns unknown keys into diagnostics on the result
//! - No state survives a call; concurrent loads only share the caller's handles

pub mod builder;
pub mod error;
pub mod policy;
pub mod source;
pub mod validation;
pub mod watcher;

use serde::Serialize;
use std::path::Path;

use crate::cache::SharedCache;
use crate::env::SharedEnv;
use crate::format::tokenize;
use crate::observability::metrics;
use crate::options::schema::{ColumnFamilyDescriptor, ColumnFamilyOptions, GlobalOptions, VersionInfo};
use crate::options::types::Revision;

pub use builder::ModelBuilder;
pub use error::LoadError;
pub use policy::{Diagnostic, DiagnosticKind, UnknownOptionPolicy};
pub use watcher::OptionsWatcher;

pub use crate::options::schema::DEFAULT_COLUMN_FAMILY;

/// Everything a load needs besides the file itself.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    /// Env the file is read through; also stored in the result.
    pub env: SharedEnv,
    pub unknown_options: UnknownOptionPolicy,
    /// Takes the place of every block cache the file describes.
    pub cache: Option<SharedCache>,
}

impl LoadContext {
    pub fn new(env: SharedEnv) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.unknown_options = UnknownOptionPolicy::from_strict(strict);
        self
    }

    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// A fully built configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadResult {
    /// The `[Version]` section, when the file has one.
    pub version: Option<VersionInfo>,
    /// Schema revision the file was decoded with.
    pub revision: Revision,
    pub global: GlobalOptions,
    /// In first-seen order, `default` last when it was synthesized.
    pub column_families: Vec<ColumnFamilyDescriptor>,
    /// Skipped unknown and obsolete keys.
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadResult {
    pub fn column_family(&self, name: &str) -> Option<&ColumnFamilyOptions> {
        self.column_families
            .iter()
            .find(|cf| cf.name == name)
            .map(|cf| &cf.options)
    }

    pub fn default_column_family(&self) -> Option<&ColumnFamilyOptions> {
        self.column_family(DEFAULT_COLUMN_FAMILY)
    }

    pub fn column_family_names(&self) -> Vec<&str> {
        self.column_families.iter().map(|cf| cf.name.as_str()).collect()
    }
}

/// Load the options file at `path` through `env`.
///
/// With `strict_unknown_options` an unknown key fails the load; otherwise it
/// is skipped and reported in [`LoadResult::diagnostics`].
///
/// A supplied `cache` replaces each `block_cache` spec the file gives. It is
/// not injected anywhere else: a family whose table options have no
/// `block_cache` key, or say `nullptr`, keeps `None`, so a file without any
/// such key leaves the caller's cache unreferenced by the result.
pub fn load(
    path: &Path,
    env: &SharedEnv,
    strict_unknown_options: bool,
    cache: Option<&SharedCache>,
) -> Result<LoadResult, LoadError> {
    let mut ctx = LoadContext::new(env.clone()).strict(strict_unknown_options);
    ctx.cache = cache.cloned();
    load_with(path, &ctx)
}

pub fn load_with(path: &Path, ctx: &LoadContext) -> Result<LoadResult, LoadError> {
    let result = source::read_options_file(path, &ctx.env).and_then(|text| build(&text, ctx));
    observe(Some(path), &result);
    result
}

/// Build from text already in memory.
pub fn parse(text: &str, ctx: &LoadContext) -> Result<LoadResult, LoadError> {
    let result = build(text, ctx);
    observe(None, &result);
    result
}

fn build(text: &str, ctx: &LoadContext) -> Result<LoadResult, LoadError> {
    let mut builder = ModelBuilder::new(ctx);
    for section in tokenize(text)? {
        builder.apply_section(&section)?;
    }
    builder.finish()
}

fn observe(path: Option<&Path>, result: &Result<LoadResult, LoadError>) {
    let path = path.map(|p| p.display().to_string()).unwrap_or_default();
    match result {
        Ok(loaded) => {
            metrics::record_load("ok");
            tracing::info!(
                path = %path,
                revision = %loaded.revision,
                column_families = loaded.column_families.len(),
                diagnostics = loaded.diagnostics.len(),
                "Options loaded"
            );
        }
        Err(e) => {
            metrics::record_load(e.kind());
            tracing::debug!(path = %path, error = %e, "Options load failed");
        }
    }
}
